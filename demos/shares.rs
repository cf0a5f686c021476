#[macro_use]
extern crate log;

use argh::FromArgs;

#[cfg(target_family = "unix")]
use easysmb::{PavaoConnection, SessionOptions, SmbLocation, SmbSession};

#[derive(FromArgs)]
#[argh(description = "
where positional is: smb://[domain;][user[:password]@]host[:port][/share[/path]]

Lists the shares of the server, or the directory at path when given.")]
struct Args {
    #[argh(option, short = 'P', description = "specify password")]
    password: Option<String>,
    #[argh(switch, short = 's', description = "fail if the share or file does not exist")]
    strict: bool,
    #[argh(positional, description = "smb location")]
    location: String,
}

#[cfg(target_family = "unix")]
fn main() -> anyhow::Result<()> {
    assert!(env_logger::builder().try_init().is_ok());
    let args: Args = argh::from_env();
    let location = SmbLocation::parse(&args.location)?;
    let password = match (&args.password, location.password.is_empty()) {
        (Some(p), _) => p.clone(),
        (None, true) if location.username != easysmb::GUEST_USER => {
            read_secret_from_tty("Password: ")?
        }
        (None, _) => location.password.clone(),
    };
    let share = location.share.clone();
    let path = location.path.clone().unwrap_or_default();

    let mut options = SessionOptions::default()
        .location(location)
        .password(password);
    if args.strict {
        options = options.existence_check(easysmb::ExistenceCheck::Strict);
    }

    info!("connecting to server {}...", options.get_host());
    let mut session = SmbSession::connect(options, PavaoConnection::default())?;
    info!("session connected ({})", session.netbios_name());

    match share {
        None => {
            for share in session.list_shares()? {
                println!("{}", share);
            }
        }
        Some(_) => {
            for entry in session.ls(&path, None)? {
                let suffix = if entry.is_directory { "/" } else { "" };
                println!("{}{}", entry.name, suffix);
            }
        }
    }

    info!("closing session...");
    session.close()?;
    info!(
        "session closed; scratch directory left at {}",
        session.scratch_dir().display()
    );

    Ok(())
}

#[cfg(target_family = "windows")]
fn main() -> anyhow::Result<()> {
    let _args: Args = argh::from_env();
    anyhow::bail!("the libsmbclient connection is only available on UNIX systems")
}

#[cfg(target_family = "unix")]
/// Read a secret from tty with customisable prompt
fn read_secret_from_tty(prompt: &str) -> std::io::Result<String> {
    rpassword::prompt_password(prompt)
}
