//! サービスごとの記述子の組み立て
//!
//! ホスト名・導出 URL・認証情報を環境変数として差し込む。
//! 環境変数のキー名はサービスイメージ側との互換性の一部なので変更しないこと。

use crate::pipeline::DeployOptions;
use hobbitflow_core::platform::{
    HOBBIT_CORE_NETWORK, HOBBIT_NETWORK, HOBBIT_SERVICE_NETWORK, KEYCLOAK_VOLUME, NETWORKS,
    PlatformService, REDIS_VOLUME, VIRTUOSO_VOLUME,
};
use hobbitflow_core::{Answers, MountSpec, RestartPolicy, WorkloadDescriptor};

/// 設定の事前投入が必要なストア
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeededStore {
    pub service: PlatformService,
    pub volume: &'static str,
    /// バンドルルートからの相対ディレクトリ
    pub bundle: &'static str,
    pub tag: &'static str,
    /// サービスコンテナ内でのボリュームのマウント先
    pub mount_target: &'static str,
}

pub const SEEDED_STORES: [SeededStore; 3] = [
    SeededStore {
        service: PlatformService::Keycloak,
        volume: KEYCLOAK_VOLUME,
        bundle: "keycloak",
        tag: "hobbit-keycloak-volume-filler",
        mount_target: "/opt/jboss/keycloak/standalone/data",
    },
    SeededStore {
        service: PlatformService::Virtuoso,
        volume: VIRTUOSO_VOLUME,
        bundle: "virtuoso",
        tag: "hobbit-virtuoso-volume-filler",
        mount_target: "/opt/virtuoso-opensource/database",
    },
    SeededStore {
        service: PlatformService::Redis,
        volume: REDIS_VOLUME,
        bundle: "redis",
        tag: "hobbit-redis-volume-filler",
        mount_target: "/data",
    },
];

impl SeededStore {
    pub fn for_service(service: PlatformService) -> Option<&'static SeededStore> {
        SEEDED_STORES.iter().find(|store| store.service == service)
    }
}

/// Virtuoso 起動直後に実行するストレージ初期化コマンド
pub const STORAGE_INIT_COMMAND: [&str; 2] =
    ["sh", "/opt/virtuoso-opensource/database/storage-init.sh"];

const DOCKER_SOCKET: &str = "/var/run/docker.sock";

/// Traefik のルーティングラベルを付与
fn routed(descriptor: WorkloadDescriptor, host: &str, port: u16) -> WorkloadDescriptor {
    descriptor
        .label("traefik.frontend.rule", format!("Host:{}", host))
        .label("traefik.port", port.to_string())
}

fn with_store_volume(descriptor: WorkloadDescriptor, service: PlatformService) -> WorkloadDescriptor {
    match SeededStore::for_service(service) {
        Some(store) => descriptor.mount(MountSpec::volume(store.volume, store.mount_target)),
        None => descriptor,
    }
}

/// サービスの記述子を組み立てる
///
/// 参照する他サービスのホスト名は、すべて起動順で先に立ち上がるもの。
pub fn descriptor_for(
    service: PlatformService,
    answers: &Answers,
    owner: &str,
    options: &DeployOptions,
) -> WorkloadDescriptor {
    let project = answers.project_name.as_str();
    let hostname = service.hostname(project);
    let rabbit_host = PlatformService::Rabbit.hostname(project);

    let base = WorkloadDescriptor::new(service.image(), &hostname, project, owner)
        .restart(RestartPolicy::Always);
    let base = with_store_volume(base, service);

    match service {
        PlatformService::Keycloak => {
            routed(base.network(HOBBIT_NETWORK), &answers.keycloak_host, 8080)
        }
        PlatformService::Virtuoso => routed(
            base.network(HOBBIT_CORE_NETWORK).network(HOBBIT_NETWORK),
            &answers.virtuoso_host,
            8890,
        ),
        PlatformService::Redis => base
            .network(HOBBIT_CORE_NETWORK)
            .command(["redis-server", "/data/redis.conf"]),
        PlatformService::Rabbit => routed(
            base.network(HOBBIT_CORE_NETWORK)
                .network(HOBBIT_SERVICE_NETWORK)
                .network(HOBBIT_NETWORK),
            &answers.rabbitmq_host,
            15672,
        ),
        PlatformService::PlatformController => {
            let descriptor = base
                .env("HOBBIT_RABBIT_HOST", &rabbit_host)
                .env("HOBBIT_REDIS_HOST", PlatformService::Redis.hostname(project))
                .env("DEPLOY_ENV", answers.deploy_env())
                .env("GITLAB_USER", &answers.gitlab_user)
                .env("GITLAB_EMAIL", &answers.gitlab_email)
                .env("GITLAB_TOKEN", &answers.gitlab_token)
                .mount(MountSpec::bind(DOCKER_SOCKET, DOCKER_SOCKET));
            NETWORKS
                .iter()
                .fold(descriptor, |descriptor, network| descriptor.network(*network))
        }
        PlatformService::Gui => routed(
            base.env(
                "KEYCLOAK_AUTH_URL",
                format!("http://{}/auth", answers.keycloak_host),
            )
            .env("CHECK_REALM_URL", format!("http://{}", answers.keycloak_host))
            .env(
                "KEYCLOAK_DIRECT_URL",
                format!(
                    "http://{}:8080/auth",
                    PlatformService::Keycloak.hostname(project)
                ),
            )
            .env("HOBBIT_RABBIT_HOST", &rabbit_host)
            .network(HOBBIT_NETWORK)
            .network(HOBBIT_CORE_NETWORK),
            &answers.gui_host,
            8080,
        ),
        PlatformService::Analysis => base
            .env("HOBBIT_RABBIT_HOST", &rabbit_host)
            .network(HOBBIT_CORE_NETWORK),
        PlatformService::Storage => base
            .env(
                "SPARQL_ENDPOINT_URL",
                format!(
                    "http://{}:8890/sparql-auth",
                    PlatformService::Virtuoso.hostname(project)
                ),
            )
            .env("SPARQL_ENDPOINT_USERNAME", &options.sparql_username)
            .env("SPARQL_ENDPOINT_PASSWORD", &options.sparql_password)
            .env("HOBBIT_RABBIT_HOST", &rabbit_host)
            .network(HOBBIT_CORE_NETWORK),
    }
}

/// パイプラインが投入する全サービスの記述子（起動順）
///
/// エンジンには一切触れない。
pub fn plan_descriptors(
    answers: &Answers,
    owner: &str,
    options: &DeployOptions,
) -> Vec<WorkloadDescriptor> {
    PlatformService::ALL
        .iter()
        .map(|service| descriptor_for(*service, answers, owner, options))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers() -> Answers {
        Answers {
            project_name: "acme".to_string(),
            is_testing: true,
            gitlab_user: "alice".to_string(),
            gitlab_email: "alice@example.org".to_string(),
            gitlab_token: "glpat-123".to_string(),
            gui_host: "gui.acme.io".to_string(),
            keycloak_host: "keycloak.acme.io".to_string(),
            virtuoso_host: "vos.acme.io".to_string(),
            rabbitmq_host: "rabbit.acme.io".to_string(),
        }
    }

    #[test]
    fn test_controller_env_wiring() {
        let d = descriptor_for(
            PlatformService::PlatformController,
            &answers(),
            "alice",
            &DeployOptions::default(),
        );
        assert!(d.env.contains(&"HOBBIT_RABBIT_HOST=hobbit-rabbit-acme".to_string()));
        assert_eq!(d.env_value("HOBBIT_REDIS_HOST"), Some("hobbit-redis-acme"));
        assert_eq!(d.env_value("DEPLOY_ENV"), Some("testing"));
        assert_eq!(d.env_value("GITLAB_TOKEN"), Some("glpat-123"));
        assert_eq!(d.networks, vec!["hobbit", "hobbit-core", "hobbit-services"]);
        assert!(d.mounts.iter().any(|m| m.target == DOCKER_SOCKET));
    }

    #[test]
    fn test_storage_points_at_virtuoso() {
        let options = DeployOptions {
            sparql_username: "vos".to_string(),
            sparql_password: "s3cret".to_string(),
            ..Default::default()
        };
        let d = descriptor_for(PlatformService::Storage, &answers(), "alice", &options);
        assert_eq!(
            d.env_value("SPARQL_ENDPOINT_URL"),
            Some("http://hobbit-virtuoso-acme:8890/sparql-auth")
        );
        assert_eq!(d.env_value("SPARQL_ENDPOINT_USERNAME"), Some("vos"));
        assert_eq!(d.env_value("SPARQL_ENDPOINT_PASSWORD"), Some("s3cret"));
    }

    #[test]
    fn test_routed_services_carry_traefik_labels() {
        let d = descriptor_for(
            PlatformService::Gui,
            &answers(),
            "alice",
            &DeployOptions::default(),
        );
        assert_eq!(
            d.labels.get("traefik.frontend.rule").map(String::as_str),
            Some("Host:gui.acme.io")
        );
        assert_eq!(d.labels.get("traefik.port").map(String::as_str), Some("8080"));

        let d = descriptor_for(
            PlatformService::Analysis,
            &answers(),
            "alice",
            &DeployOptions::default(),
        );
        assert!(!d.labels.contains_key("traefik.frontend.rule"));
    }

    #[test]
    fn test_seeded_stores_mount_their_volume() {
        for store in SEEDED_STORES {
            let d = descriptor_for(store.service, &answers(), "alice", &DeployOptions::default());
            assert!(
                d.mounts
                    .iter()
                    .any(|m| m.source == store.volume && m.target == store.mount_target),
                "{} does not mount {}",
                d.name,
                store.volume
            );
        }

        let redis = descriptor_for(
            PlatformService::Redis,
            &answers(),
            "alice",
            &DeployOptions::default(),
        );
        assert_eq!(
            redis.command,
            Some(vec![
                "redis-server".to_string(),
                "/data/redis.conf".to_string()
            ])
        );
    }

    /// 環境変数で参照されるホスト名は、先に起動するサービスのものだけ
    #[test]
    fn test_env_only_references_earlier_services() {
        let plan = plan_descriptors(&answers(), "alice", &DeployOptions::default());
        assert_eq!(plan.len(), PlatformService::ALL.len());

        for (index, descriptor) in plan.iter().enumerate() {
            for later in &plan[index..] {
                let referenced = descriptor
                    .env
                    .iter()
                    .any(|entry| entry.contains(&later.hostname));
                assert!(
                    !referenced,
                    "{} references {} which is not launched yet",
                    descriptor.name, later.hostname
                );
            }
        }
    }
}
