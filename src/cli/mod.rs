//! Line-oriented front end.
//!
//! Reads one command per line from stdin, dispatches the matching intent on
//! [`ChatApp`], and prints a plain-text snapshot of whatever changed. All
//! state lives in the core; this module only renders it.

use std::error::Error;
use std::path::Path;
use tokio::io::{stdin, AsyncBufReadExt, BufReader};

use crate::api::client::HttpChatApi;
use crate::api::{FileUpload, Message, RegisterForm};
use crate::core::app::ChatApp;
use crate::core::config::Config;
use crate::core::session_store::SessionStore;

const HELP: &str = "\
Commands:
  login <username> <password>
  register <username> <password> <gender> <full name...>
  users                         refresh and list the directory
  open <username|id>            open a one-to-one conversation
  send <text...>                send text to the open conversation
  sendfile <path> [caption...]  send a file, with optional text
  whoami                        validate the session against the server
  clear                         dismiss the last notice
  logout
  quit";

pub async fn run(server_override: Option<String>) -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;
    let server_url = server_override.unwrap_or_else(|| config.server_url().to_string());
    tracing::info!(%server_url, "connecting");

    let api = HttpChatApi::new(&server_url)?;
    let mut app = ChatApp::new(Box::new(api), SessionStore::open_default());

    if let Some(identity) = &app.session.identity {
        println!("Signed in as @{} (restored session).", identity.username);
    } else {
        println!("Not signed in. Try `login <username> <password>` or `help`.");
    }

    let mut lines = BufReader::new(stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or_default();
        let rest: Vec<&str> = parts.collect();

        match command {
            "help" => println!("{HELP}"),
            "quit" | "exit" => break,
            "login" => match rest.as_slice() {
                [username, password] => {
                    app.login(username, password).await;
                    report(&app);
                }
                _ => println!("Usage: login <username> <password>"),
            },
            "register" => match rest.as_slice() {
                [username, password, gender, name @ ..] if !name.is_empty() => {
                    let form = RegisterForm {
                        full_name: name.join(" "),
                        username: (*username).to_string(),
                        password: (*password).to_string(),
                        confirm_password: (*password).to_string(),
                        gender: (*gender).to_string(),
                        profile_photo: None,
                    };
                    app.register(&form).await;
                    report(&app);
                }
                _ => println!("Usage: register <username> <password> <gender> <full name...>"),
            },
            "users" => {
                app.load_users().await;
                report(&app);
                for (index, entry) in app.directory.entries.iter().enumerate() {
                    let status = entry.status.as_deref().unwrap_or("offline");
                    println!(
                        "{:>3}. {} (@{}) [{}]",
                        index + 1,
                        entry.full_name,
                        entry.username,
                        status
                    );
                }
            }
            "open" => match rest.as_slice() {
                [key] => {
                    let Some(peer_id) = app.directory.find(key).map(|e| e.id.clone()) else {
                        println!("No such user: {key}. Run `users` first.");
                        continue;
                    };
                    app.open_conversation(&peer_id).await;
                    report(&app);
                    render_conversation(&app);
                }
                _ => println!("Usage: open <username|id>"),
            },
            "send" => {
                if rest.is_empty() {
                    println!("Usage: send <text...>");
                    continue;
                }
                let before = app.conversation.messages.len();
                app.send(Some(&rest.join(" ")), None).await;
                report(&app);
                render_new_messages(&app, before);
            }
            "sendfile" => match rest.split_first() {
                Some((path, caption)) => {
                    let upload = match read_upload(Path::new(path)).await {
                        Ok(upload) => upload,
                        Err(err) => {
                            println!("Cannot read {path}: {err}");
                            continue;
                        }
                    };
                    let caption = caption.join(" ");
                    let body = (!caption.is_empty()).then_some(caption.as_str());
                    let before = app.conversation.messages.len();
                    app.send(body, Some(&upload)).await;
                    report(&app);
                    render_new_messages(&app, before);
                }
                None => println!("Usage: sendfile <path> [caption...]"),
            },
            "whoami" => {
                app.refresh_identity().await;
                match &app.session.identity {
                    Some(identity) => {
                        println!("{} (@{})", identity.full_name, identity.username)
                    }
                    None => println!("Not signed in."),
                }
            }
            "clear" => app.clear_notice(),
            "logout" => {
                app.logout().await;
                report(&app);
                if app.session.identity.is_none() {
                    println!("Signed out.");
                }
            }
            other => println!("Unknown command: {other}. Try `help`."),
        }
    }

    Ok(())
}

/// Print the latest notice, if any, then leave the flags for `clear`.
fn report(app: &ChatApp) {
    if let Some(error) = &app.session.error {
        println!("! {error}");
    } else if !app.session.message.is_empty() {
        println!("* {}", app.session.message);
    }
}

fn render_conversation(app: &ChatApp) {
    match &app.conversation.peer_id {
        Some(peer_id) => {
            println!(
                "-- {} message(s) with {peer_id} --",
                app.conversation.messages.len()
            );
            for message in &app.conversation.messages {
                println!("{}", format_message(app, message));
            }
        }
        None => println!("No open conversation."),
    }
}

fn render_new_messages(app: &ChatApp, since: usize) {
    for message in app.conversation.messages.iter().skip(since) {
        println!("{}", format_message(app, message));
    }
}

fn format_message(app: &ChatApp, message: &Message) -> String {
    let me = app.session.identity.as_ref().map(|i| i.id.as_str());
    let who = if message.sender_id.as_deref() == me && me.is_some() {
        "me"
    } else {
        "them"
    };
    let stamp = message
        .created_at
        .map(|at| at.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string());

    let mut line = format!("[{stamp}] {who}:");
    if let Some(url) = &message.file_url {
        let label = message.file_name.as_deref().unwrap_or("attachment");
        line.push_str(&format!(" <{label}: {url}>"));
    }
    if let Some(body) = &message.message {
        line.push(' ');
        line.push_str(body);
    }
    if message.is_empty() {
        line.push_str(" (sent)");
    }
    line
}

async fn read_upload(path: &Path) -> std::io::Result<FileUpload> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "attachment".to_string());
    Ok(FileUpload {
        file_name,
        bytes,
        mime: None,
    })
}
