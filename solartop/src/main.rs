//! Entry point for the solartop TUI. Parses args, resolves the profile, and
//! wires the telemetry session to the App.

use solartop::app::{event_channel, App};
use solartop::profiles::{load_profiles, save_profiles, ProfileEntry, ProfileRequest, ResolveProfile};
use solartop::session::{Session, SessionConfig, DEFAULT_HISTORY};
use std::env;
use std::io::{self, Write};
use std::time::Duration;

struct ParsedArgs {
    url: Option<String>,
    profile: Option<String>,
    history: Option<i64>,
    save: bool,
    dry_run: bool,
}

fn usage(prog: &str) -> String {
    format!(
        "Usage: {prog} [--history N|-n N] [--profile NAME|-P NAME] [--save] [--dry-run] [ws://HOST:PORT/ws]"
    )
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<ParsedArgs, String> {
    let mut it = args.into_iter();
    let prog = it.next().unwrap_or_else(|| "solartop".into());
    let mut url: Option<String> = None;
    let mut profile: Option<String> = None;
    let mut history: Option<i64> = None;
    let mut save = false; // --save
    let mut dry_run = false; // --dry-run

    while let Some(arg) = it.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                return Err(usage(&prog));
            }
            "--history" | "-n" => match it.next().and_then(|v| v.parse::<i64>().ok()) {
                Some(n) => history = Some(n),
                None => return Err(format!("--history expects a sample count. {}", usage(&prog))),
            },
            "--profile" | "-P" => {
                profile = it.next();
            }
            "--save" => {
                save = true;
            }
            "--dry-run" => {
                dry_run = true;
            }
            _ if arg.starts_with("--history=") => {
                if let Some((_, v)) = arg.split_once('=') {
                    match v.parse::<i64>() {
                        Ok(n) => history = Some(n),
                        Err(_) => {
                            return Err(format!(
                                "--history expects a sample count. {}",
                                usage(&prog)
                            ))
                        }
                    }
                }
            }
            _ if arg.starts_with("--profile=") => {
                if let Some((_, v)) = arg.split_once('=') {
                    if !v.is_empty() {
                        profile = Some(v.to_string());
                    }
                }
            }
            _ => {
                if url.is_none() {
                    url = Some(arg);
                } else {
                    return Err(format!("Unexpected argument. {}", usage(&prog)));
                }
            }
        }
    }
    Ok(ParsedArgs {
        url,
        profile,
        history,
        save,
        dry_run,
    })
}

// The terminal belongs to the TUI, so logs only go to a file the user asked
// for: SOLARTOP_LOG=/path/to/file, with RUST_LOG controlling the filter.
fn init_logging() {
    let Ok(path) = std::env::var("SOLARTOP_LOG") else {
        return;
    };
    let file = match std::fs::File::create(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("cannot open log file '{path}': {e}");
            return;
        }
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(std::sync::Arc::new(file))
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // Reuse the same parsing logic for testability
    let parsed = match parse_args(env::args()) {
        Ok(v) => v,
        Err(msg) => {
            eprintln!("{msg}");
            return Ok(());
        }
    };

    let profiles_file = load_profiles();
    let req = ProfileRequest {
        profile_name: parsed.profile.clone(),
        url: parsed.url.clone(),
        history: parsed.history,
    };
    let resolved = req.resolve(&profiles_file);

    // Determine final connection parameters (and maybe mutated profiles to persist)
    let mut profiles_mut = profiles_file.clone();
    let (url, history): (String, Option<i64>) = match resolved {
        ResolveProfile::Direct(u, n) => {
            // Possibly save if profile specified and --save or new entry
            if let Some(name) = parsed.profile.as_ref() {
                let entry = ProfileEntry {
                    url: u.clone(),
                    history: n,
                };
                match profiles_mut.profiles.get(name) {
                    None => {
                        // New profile: auto-save immediately
                        profiles_mut.profiles.insert(name.clone(), entry);
                        let _ = save_profiles(&profiles_mut);
                    }
                    Some(existing) => {
                        if *existing != entry {
                            let overwrite = if parsed.save {
                                true
                            } else {
                                prompt_yes_no(&format!(
                                    "Overwrite existing profile '{name}'? [y/N]: "
                                ))
                            };
                            if overwrite {
                                profiles_mut.profiles.insert(name.clone(), entry);
                                let _ = save_profiles(&profiles_mut);
                            }
                        }
                    }
                }
            }
            (u, n)
        }
        ResolveProfile::Loaded(u, n) => (u, parsed.history.or(n)),
        ResolveProfile::PromptSelect(names) => {
            eprintln!("Select profile:");
            for (i, n) in names.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, n);
            }
            eprint!("Enter number (or blank to abort): ");
            let _ = io::stderr().flush();
            let mut line = String::new();
            if io::stdin().read_line(&mut line).is_err() {
                return Ok(());
            }
            let Ok(idx) = line.trim().parse::<usize>() else {
                return Ok(());
            };
            if idx < 1 || idx > names.len() {
                return Ok(());
            }
            match profiles_mut.profiles.get(&names[idx - 1]) {
                Some(entry) => (entry.url.clone(), parsed.history.or(entry.history)),
                None => return Ok(()),
            }
        }
        ResolveProfile::PromptCreate(name) => {
            eprintln!("Profile '{name}' does not exist yet.");
            let url = prompt_string("Enter URL (ws://HOST:PORT/ws or wss://...): ")?;
            if url.trim().is_empty() {
                return Ok(());
            }
            let entry = ProfileEntry {
                url: url.trim().to_string(),
                history: parsed.history,
            };
            profiles_mut.profiles.insert(name.clone(), entry.clone());
            let _ = save_profiles(&profiles_mut);
            (entry.url, entry.history)
        }
        ResolveProfile::None => {
            eprintln!("No URL provided and no profiles to select.");
            return Ok(());
        }
    };

    // Catch typos up front; the session would otherwise retry them forever
    match url::Url::parse(&url) {
        Ok(u) if matches!(u.scheme(), "ws" | "wss") => {}
        Ok(u) => {
            eprintln!("URL must use ws:// or wss://, got '{}'", u.scheme());
            return Ok(());
        }
        Err(e) => {
            eprintln!("Invalid URL '{url}': {e}");
            return Ok(());
        }
    }

    // Profile handling done; used by tests to exercise persistence without a server
    if parsed.dry_run {
        return Ok(());
    }

    let mut cfg = SessionConfig::new(url.clone());
    cfg.history = history.unwrap_or(DEFAULT_HISTORY);

    let (sink, mut events) = event_channel();
    let (session, handle) = Session::new(cfg, sink);
    let session_task = tokio::spawn(session.run());

    let mut app = App::new(url);
    let res = app.run(&handle, &mut events).await;

    handle.stop();
    let _ = tokio::time::timeout(Duration::from_secs(1), session_task).await;
    res
}

fn prompt_yes_no(prompt: &str) -> bool {
    eprint!("{prompt}");
    let _ = io::stderr().flush();
    let mut line = String::new();
    if io::stdin().read_line(&mut line).is_ok() {
        matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    } else {
        false
    }
}

fn prompt_string(prompt: &str) -> io::Result<String> {
    eprint!("{prompt}");
    let _ = io::stderr().flush();
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("solartop")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn positional_url_and_flags() {
        let p = parse_args(args(&["ws://host:3030/ws", "--history", "25", "--save"])).unwrap();
        assert_eq!(p.url.as_deref(), Some("ws://host:3030/ws"));
        assert_eq!(p.history, Some(25));
        assert!(p.save);
        assert!(!p.dry_run);
    }

    #[test]
    fn equals_forms_and_short_flags() {
        let p = parse_args(args(&["-P", "home", "--history=42", "--dry-run"])).unwrap();
        assert_eq!(p.profile.as_deref(), Some("home"));
        assert_eq!(p.history, Some(42));
        assert!(p.dry_run);
    }

    #[test]
    fn help_and_bad_input_return_usage() {
        assert!(parse_args(args(&["--help"])).is_err());
        assert!(parse_args(args(&["ws://a/ws", "ws://b/ws"])).is_err());
        assert!(parse_args(args(&["--history", "lots"])).is_err());
    }
}
