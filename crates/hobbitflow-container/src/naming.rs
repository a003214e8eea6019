//! イメージからのデプロイ名導出

/// イメージ参照からデプロイ名を決定的に導出する
///
/// - `sha256:` ダイジェストは先頭12桁を使い `hobbit-filler-<hex>` にする
/// - タグ付き参照はレジストリ・タグを除いたリポジトリ名を使う
pub fn name_from_image(image: &str) -> String {
    if let Some(hex) = image.strip_prefix("sha256:") {
        let short: String = hex.chars().take(12).collect();
        return format!("hobbit-filler-{}", sanitize(&short));
    }

    let without_digest = image.split('@').next().unwrap_or(image);
    let (repository, _) = split_image_tag(without_digest);
    let base = repository.rsplit('/').next().unwrap_or(repository);
    let base = sanitize(base);

    if base.starts_with("hobbit-") {
        base
    } else {
        format!("hobbit-{}", base)
    }
}

/// イメージ名とタグを分離
///
/// レジストリのポート番号（`host:4567/...`）はタグとみなさない。
/// 例: "redis:4.0.7" -> ("redis", Some("4.0.7"))
///     "git.project-hobbit.eu:4567/gitadmin/gui" -> (同左, None)
pub fn split_image_tag(image: &str) -> (&str, Option<&str>) {
    match image.rsplit_once(':') {
        Some((name, tag)) if !tag.contains('/') => (name, Some(tag)),
        _ => (image, None),
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}
