use std::io;

#[allow(dead_code)]
#[path = "../session.rs"]
mod session;

use depth_core::config::{AccessKeys, MissionConfig};
use session::{Session, TranscriptProfile};

fn main() -> io::Result<()> {
    record_profile(TranscriptProfile::Ascent)?;
    record_profile(TranscriptProfile::Clamp)?;
    record_profile(TranscriptProfile::Fault)?;
    Ok(())
}

fn record_profile(profile: TranscriptProfile) -> io::Result<()> {
    let config = match profile {
        TranscriptProfile::Fault => {
            MissionConfig::lander().with_access_keys(AccessKeys::new([23, 353, 1687]))
        }
        TranscriptProfile::Ascent | TranscriptProfile::Clamp => MissionConfig::lander(),
    };

    let mut session = Session::new(profile, &config)?;
    let _ = session.boot()?;
    match profile {
        TranscriptProfile::Ascent => record_ascent(&mut session),
        TranscriptProfile::Clamp => record_clamp(&mut session),
        TranscriptProfile::Fault => record_fault(&mut session),
    }
}

fn record_ascent<W: io::Write>(session: &mut Session<W>) -> io::Result<()> {
    for command in [
        "turn cw 25",
        "tick",
        "turn cw 10",
        "tick",
        "turn cw",
        "tick 2",
        "glitch",
        "turn cw 14",
        "tick",
        "status",
        "turn cw 15",
        "tick",
        "turn ccw 3",
        "tick",
        "status",
    ] {
        let _ = session.handle_command(command)?;
    }
    Ok(())
}

fn record_clamp<W: io::Write>(session: &mut Session<W>) -> io::Result<()> {
    for command in [
        "turn ccw 5",
        "tick",
        "status",
        "turn cw",
        "tick",
        "restart",
        "status",
    ] {
        let _ = session.handle_command(command)?;
    }
    Ok(())
}

fn record_fault<W: io::Write>(session: &mut Session<W>) -> io::Result<()> {
    for command in ["status", "turn cw 10", "help"] {
        let _ = session.handle_command(command)?;
    }
    Ok(())
}
