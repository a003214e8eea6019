use colored::Colorize;
use hobbitflow_config::HobbitConfig;
use hobbitflow_core::WorkloadDescriptor;
use hobbitflow_deploy::{DeployOptions, SEEDED_STORES, plan_descriptors};

/// 表示時に値を伏せる環境変数
const SECRET_KEYS: [&str; 2] = ["GITLAB_TOKEN", "SPARQL_ENDPOINT_PASSWORD"];

fn mask_secrets(mut descriptor: WorkloadDescriptor) -> WorkloadDescriptor {
    for entry in descriptor.env.iter_mut() {
        if let Some((key, _)) = entry.split_once('=')
            && SECRET_KEYS.contains(&key)
        {
            *entry = format!("{}=********", key);
        }
    }
    descriptor
}

pub fn handle(config: &HobbitConfig, owner: &str, json: bool) -> anyhow::Result<()> {
    let options = DeployOptions::from_settings(&config.settings);
    let plan: Vec<WorkloadDescriptor> = plan_descriptors(&config.answers, owner, &options)
        .into_iter()
        .map(mask_secrets)
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "デプロイ計画:".bold(),
        config.answers.project_name.cyan()
    );
    println!();

    println!("{}", "設定ボリューム".bold());
    for store in SEEDED_STORES {
        println!(
            "  {} ← {} ({})",
            store.volume.cyan(),
            options.bundle_root.join(store.bundle).display(),
            store.tag.dimmed()
        );
    }
    println!();

    println!("{}", "サービス（起動順）".bold());
    for (index, descriptor) in plan.iter().enumerate() {
        println!(
            "  {}. {} {}",
            index + 1,
            descriptor.name.green(),
            descriptor.image.dimmed()
        );
        if !descriptor.networks.is_empty() {
            println!("     networks: {}", descriptor.networks.join(", "));
        }
        for mount in &descriptor.mounts {
            println!("     mount: {} -> {}", mount.source, mount.target);
        }
        for env in &descriptor.env {
            println!("     env: {}", env);
        }
        if let Some(command) = &descriptor.command {
            println!("     command: {}", command.join(" "));
        }
    }

    Ok(())
}
