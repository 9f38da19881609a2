//! # Help Text
//!
//! Welcome screen, guides and the command listing.
//! All Markdown here is Telegram's legacy `Markdown` mode.

use crate::domain::commands::CommandTable;

pub const BUTTON_COMMANDS: &str = "📋 Available Commands";
pub const BUTTON_HELP: &str = "❓ Help & Guide";
pub const BUTTON_REPO: &str = "🌐 GitHub Repository";

pub fn welcome(first_name: &str) -> String {
    format!(
        concat!(
            "👋 *Welcome {name}!*\n\n",
            "🚀 *Neko Actions Bot* - Deploy remote desktop instances on demand\n\n",
            "This bot allows you to deploy containerized desktop environments ",
            "(browsers, VLC, KDE, etc.) using GitHub Actions.\n\n",
            "Use the buttons below to get started:"
        ),
        name = escape_markdown(first_name)
    )
}

pub fn guide(repo_url: &str) -> String {
    format!(
        concat!(
            "📖 *User Guide*\n\n",
            "*How to Use:*\n",
            "1️⃣ Choose a browser or desktop environment\n",
            "2️⃣ Send its command (see `/actionslist`)\n",
            "3️⃣ Wait for deployment (takes ~1-2 minutes)\n",
            "4️⃣ Receive connection details via message\n",
            "5️⃣ Click *Cancel* button to stop the instance\n\n",
            "*Available Commands:*\n",
            "• `/start` - Show welcome menu\n",
            "• `/help` - Show this guide\n",
            "• `/actionslist` - List all browser commands\n\n",
            "*Instance Details:*\n",
            "• Runtime: Up to 6 hours\n",
            "• Access: Via Cloudflare Tunnel, Bore or LocalTunnel\n",
            "• Auto-cleanup: Resources freed after stop\n\n",
            "*Troubleshooting:*\n",
            "❌ If deployment fails, you'll receive an error message\n",
            "🔄 Check GitHub Actions logs for details\n",
            "⏱️ Cancel button works immediately\n\n",
            "💡 *Repository:* [GitHub]({repo})"
        ),
        repo = repo_url
    )
}

pub const QUICK_GUIDE: &str = concat!(
    "📖 *Quick Guide*\n\n",
    "*Steps:*\n",
    "1️⃣ Send a command from `/actionslist`\n",
    "2️⃣ Wait ~1-2 minutes for deployment\n",
    "3️⃣ Receive connection URLs\n",
    "4️⃣ Click *Cancel* to stop\n\n",
    "*Runtime:* Up to 6 hours\n",
    "*Access:* Cloudflare Tunnel, Bore or LocalTunnel\n",
    "*Auto-cleanup:* Yes\n\n",
    "Use `/help` for full documentation"
);

/// One `/command` per line, in table order.
pub fn command_list(table: &CommandTable) -> String {
    table
        .commands()
        .map(|cmd| format!("• `/{cmd}`"))
        .collect::<Vec<_>>()
        .join("\n")
}

const USAGE: &str = "*Usage:*\nSimply type any command above to start an instance";

/// Reply to `/actionslist`.
pub fn actions_list(table: &CommandTable) -> String {
    format!(
        "🎯 *Available Commands:*\n\n{}\n\n{}\n\n{}",
        command_list(table),
        USAGE,
        "To stop a running instance, click the *Cancel* button on the deployment message."
    )
}

/// Same listing, shown in place of the welcome menu.
pub fn actions_menu(table: &CommandTable) -> String {
    format!("🎯 *Available Commands:*\n\n{}\n\n{}", command_list(table), USAGE)
}

/// Escapes the characters legacy Markdown treats as entity delimiters.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::CommandEntry;

    #[test]
    fn test_command_list_follows_table_order() {
        let table = table(&[
            ("vlc", "vlc"),
            ("ungoogled_chromium", "ungoogled-chromium"),
            ("kde", "kde"),
        ]);

        let listing = command_list(&table);
        let lines: Vec<_> = listing.lines().collect();
        assert_eq!(
            lines,
            vec!["• `/vlc`", "• `/ungoogled_chromium`", "• `/kde`"]
        );
    }

    fn table(entries: &[(&str, &str)]) -> CommandTable {
        CommandTable::new(
            entries
                .iter()
                .map(|(command, image)| CommandEntry {
                    command: command.to_string(),
                    image: image.to_string(),
                })
                .collect(),
        )
        .unwrap()
    }

    /// Every backticked `/token` in `text`, in order of appearance.
    fn advertised(text: &str) -> Vec<&str> {
        text.split('`')
            .skip(1)
            .step_by(2)
            .filter(|span| span.starts_with('/'))
            .collect()
    }

    #[test]
    fn test_listings_enumerate_exactly_the_table() {
        let table = table(&[("vlc", "vlc"), ("kde", "kde")]);
        assert_eq!(advertised(&actions_list(&table)), vec!["/vlc", "/kde"]);
        assert_eq!(advertised(&actions_menu(&table)), vec!["/vlc", "/kde"]);
    }

    #[test]
    fn test_guides_only_advertise_reserved_commands() {
        let guide = guide("https://github.com/me/desk");
        for text in [guide.as_str(), QUICK_GUIDE] {
            for token in advertised(text) {
                assert!(
                    ["/start", "/help", "/actionslist"].contains(&token),
                    "{token}"
                );
            }
        }
    }

    #[test]
    fn test_listing_mentions_every_builtin_command_once() {
        let table = CommandTable::default();
        let text = actions_list(&table);
        for cmd in table.commands() {
            assert_eq!(text.matches(&format!("`/{cmd}`")).count(), 1, "{cmd}");
        }
        assert!(text.contains("Cancel"));
    }

    #[test]
    fn test_welcome_escapes_name() {
        let text = welcome("snake_case*");
        assert!(text.contains("snake\\_case\\*"));
    }

    #[test]
    fn test_guide_links_repository() {
        let text = guide("https://github.com/me/desk");
        assert!(text.contains("(https://github.com/me/desk)"));
    }
}
