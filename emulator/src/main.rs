mod session;

use std::env;
use std::io::{self, BufRead, Write};
use std::process;

use crossterm::style::{Color, Stylize};
use depth_core::config::{AccessKeys, MissionConfig};
use session::{Response, Session, TranscriptProfile, parse_access_keys};

const USAGE: &str = "Usage: ascent-emulator [--profile <ascent|clamp|fault>] [--keys <a,b,c>]";

struct Options {
    profile: TranscriptProfile,
    keys: Option<AccessKeys>,
}

fn main() -> io::Result<()> {
    let options = parse_options().unwrap_or_else(|err| {
        eprintln!("{err}");
        eprintln!("{USAGE}");
        process::exit(2);
    });

    let mut config = MissionConfig::lander();
    if let Some(keys) = options.keys {
        config = config.with_access_keys(keys);
    }

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let stdout = io::stdout();
    let mut writer = stdout.lock();
    let mut session = Session::new(options.profile, &config)?;
    let mut line = String::new();

    writeln!(
        writer,
        "Ascent Emulator ready. Type `help` for commands or `exit` to quit."
    )?;
    for response in session.boot()? {
        write_response(&mut writer, &response)?;
    }

    loop {
        line.clear();
        write!(writer, "> ")?;
        writer.flush()?;

        let bytes_read = reader.read_line(&mut line)?;
        if bytes_read == 0 {
            writeln!(writer)?;
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if should_terminate(trimmed) {
            writeln!(writer, "Session closed.")?;
            break;
        }

        for response in session.handle_command(trimmed)? {
            write_response(&mut writer, &response)?;
        }
    }

    Ok(())
}

fn write_response(writer: &mut impl Write, response: &Response) -> io::Result<()> {
    match response {
        Response::Lamp(color) => {
            let swatch = "●".with(Color::Rgb {
                r: color.red,
                g: color.green,
                b: color.blue,
            });
            writeln!(writer, "{response} {swatch}")
        }
        Response::Text(_) => writeln!(writer, "{response}"),
    }
}

fn should_terminate(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}

fn parse_options() -> Result<Options, String> {
    let mut options = Options {
        profile: TranscriptProfile::Ascent,
        keys: None,
    };

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if let Some(value) = arg.strip_prefix("--profile=") {
            options.profile = TranscriptProfile::from_tag(value)?;
        } else if arg == "--profile" {
            let value = args
                .next()
                .ok_or_else(|| "Expected value after --profile".to_string())?;
            options.profile = TranscriptProfile::from_tag(&value)?;
        } else if let Some(value) = arg.strip_prefix("--keys=") {
            options.keys = Some(parse_access_keys(value)?);
        } else if arg == "--keys" {
            let value = args
                .next()
                .ok_or_else(|| "Expected value after --keys".to_string())?;
            options.keys = Some(parse_access_keys(&value)?);
        } else {
            options.profile = TranscriptProfile::from_tag(&arg)?;
        }
    }

    Ok(options)
}
