use std::{env, env::VarError};

/// There's no real CLI for the server, so just do quick 'n dirty
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        // No arguments are expected, so any argument prints the help
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // FOG_STORE_SERVICE_KEY and FOG_TAP_SECRET_KEY must never be added here
    const DISPLAY_ENVS: [&str; 20] = [
        "RUST_LOG",
        "FOG_HOST",
        "FOG_PORT",
        "FOG_TENANT_ID",
        "FOG_BRANCH_ID",
        "FOG_WEB_USER_ID",
        "FOG_CURRENCY",
        "FOG_STORE_URL",
        "FOG_TAP_API_URL",
        "FOG_TAP_TOKEN_URL",
        "FOG_TAP_CLIENT_ID",
        "FOG_HTTP_TIMEOUT",
        "FOG_PAYMENT_REDIRECT_URL",
        "FOG_PAYMENT_WEBHOOK_URL",
        "FOG_PAYMENT_WEBHOOK_WHITELIST",
        "FOG_USE_X_FORWARDED_FOR",
        "FOG_USE_FORWARDED",
        "FOG_CORS_ORIGINS",
        "FOG_PROVISIONAL_RECHECK_MINUTES",
        "FOG_PROVISIONAL_ORDER_TIMEOUT_HOURS",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<38} {val:<15}");
    })
}
