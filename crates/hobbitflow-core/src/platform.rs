//! HOBBIT プラットフォームの固定トポロジー
//!
//! イメージ・ボリューム・ネットワーク名はサービスイメージ側との互換性の一部なので変更しないこと。

pub const PLATFORM_CONTROLLER_IMAGE: &str =
    "git.project-hobbit.eu:4567/gitadmin/platform-controller-image";
pub const GUI_IMAGE: &str = "git.project-hobbit.eu:4567/gitadmin/platform-gui-image";
pub const KEYCLOAK_IMAGE: &str = "git.project-hobbit.eu:4567/gitadmin/hobbit-keycloak:1.0.0";
pub const ANALYSIS_IMAGE: &str = "git.project-hobbit.eu:4567/gitadmin/platform-analysis-image";
pub const RABBIT_IMAGE: &str = "rabbitmq:management";
pub const REDIS_IMAGE: &str = "redis:4.0.7";
pub const VIRTUOSO_IMAGE: &str = "openlink/virtuoso_opensource:v07.20.3217";
pub const STORAGE_SERVICE_IMAGE: &str =
    "git.project-hobbit.eu:4567/gitadmin/platform-storage-image";

/// HOBBIT GitLab のコンテナレジストリ
pub const HOBBIT_REGISTRY: &str = "git.project-hobbit.eu:4567";

pub const KEYCLOAK_VOLUME: &str = "hobbit-keycloak-config";
pub const VIRTUOSO_VOLUME: &str = "hobbit-virtuoso-config";
pub const REDIS_VOLUME: &str = "hobbit-redis-config";

pub const HOBBIT_NETWORK: &str = "hobbit";
pub const HOBBIT_CORE_NETWORK: &str = "hobbit-core";
pub const HOBBIT_SERVICE_NETWORK: &str = "hobbit-services";

/// 作成順に並べたネットワーク
pub const NETWORKS: [&str; 3] = [HOBBIT_NETWORK, HOBBIT_CORE_NETWORK, HOBBIT_SERVICE_NETWORK];

/// フィラーコンテナ内でボリュームをマウントするパス
pub const FILLER_MOUNT_TARGET: &str = "/cfg-volume";

/// プラットフォームを構成するサービス（起動順）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformService {
    Keycloak,
    Virtuoso,
    Redis,
    Rabbit,
    PlatformController,
    Gui,
    Analysis,
    Storage,
}

impl PlatformService {
    pub const ALL: [PlatformService; 8] = [
        Self::Keycloak,
        Self::Virtuoso,
        Self::Redis,
        Self::Rabbit,
        Self::PlatformController,
        Self::Gui,
        Self::Analysis,
        Self::Storage,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Self::Keycloak => "keycloak",
            Self::Virtuoso => "virtuoso",
            Self::Redis => "redis",
            Self::Rabbit => "rabbit",
            Self::PlatformController => "platform-controller",
            Self::Gui => "gui",
            Self::Analysis => "analysis",
            Self::Storage => "storage",
        }
    }

    pub fn image(&self) -> &'static str {
        match self {
            Self::Keycloak => KEYCLOAK_IMAGE,
            Self::Virtuoso => VIRTUOSO_IMAGE,
            Self::Redis => REDIS_IMAGE,
            Self::Rabbit => RABBIT_IMAGE,
            Self::PlatformController => PLATFORM_CONTROLLER_IMAGE,
            Self::Gui => GUI_IMAGE,
            Self::Analysis => ANALYSIS_IMAGE,
            Self::Storage => STORAGE_SERVICE_IMAGE,
        }
    }

    /// プロジェクト内でのホスト名（デプロイ名を兼ねる）
    ///
    /// 例: `hobbit-rabbit-acme`
    pub fn hostname(&self, project: &str) -> String {
        format!("hobbit-{}-{}", self.slug(), project)
    }
}
