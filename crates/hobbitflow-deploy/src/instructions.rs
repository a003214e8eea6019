//! デプロイ完了後の手動設定手順

use hobbitflow_core::Answers;

pub const READY_MESSAGE: &str = "You are ready to go!";

/// Keycloak 管理コンソールで行う残りの設定手順
///
/// 最終行は常に [`READY_MESSAGE`]。
pub fn follow_up_instructions(answers: &Answers) -> Vec<String> {
    vec![
        "HOBBIT platform is up. A few manual steps remain in the Keycloak admin console:"
            .to_string(),
        format!(
            "1. Open http://{}/auth/admin/ and sign in as the Keycloak administrator.",
            answers.keycloak_host
        ),
        "2. Change the administrator password right away.".to_string(),
        format!(
            "3. In the 'Hobbit' realm, open Clients > Hobbit-GUI and set 'Valid Redirect URIs' to http://{}/*",
            answers.gui_host
        ),
        format!(
            "4. In the same client, set 'Web Origins' to http://{}",
            answers.gui_host
        ),
        "5. Create accounts for your users under Users and assign the roles they need.".to_string(),
        format!(
            "Platform GUI: http://{} / Virtuoso: http://{} / RabbitMQ: http://{}",
            answers.gui_host, answers.virtuoso_host, answers.rabbitmq_host
        ),
        READY_MESSAGE.to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instructions_end_with_ready_message() {
        let answers = Answers {
            gui_host: "gui.acme.io".to_string(),
            keycloak_host: "keycloak.acme.io".to_string(),
            ..Default::default()
        };
        let lines = follow_up_instructions(&answers);
        assert_eq!(lines.last().map(String::as_str), Some(READY_MESSAGE));
        assert!(lines.iter().any(|l| l.contains("http://keycloak.acme.io/auth/admin/")));
        assert!(lines.iter().any(|l| l.contains("http://gui.acme.io/*")));
    }
}
