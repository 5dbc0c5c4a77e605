/// Line commands understood by the player
use lazer_core::BeatmapSetId;
use lazer_playback::RepeatMode;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Play,
    /// Play from the beginning
    Restart,
    Pause,
    Toggle,
    Stop,
    Next,
    Prev,
    Seek(f64),
    /// Let `ms` milliseconds of playback time pass
    Advance(u64),
    Select(BeatmapSetId),
    Repeat(RepeatMode),
    Status,
    List,
    Quit,
}

#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("{0} needs an argument")]
    MissingArgument(&'static str),

    #[error("Invalid argument for {command}: {value}")]
    InvalidArgument { command: &'static str, value: String },

    #[error("{0} takes no arguments")]
    UnexpectedArgument(&'static str),

    #[error("Too many arguments")]
    TooManyArguments,
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let name = parts.next().ok_or(CommandError::Empty)?;
        let arg = parts.next();

        if parts.next().is_some() {
            return Err(CommandError::TooManyArguments);
        }

        let command = match name.to_ascii_lowercase().as_str() {
            "play" => no_arg("play", arg, Command::Play)?,
            "restart" => no_arg("restart", arg, Command::Restart)?,
            "pause" => no_arg("pause", arg, Command::Pause)?,
            "toggle" => no_arg("toggle", arg, Command::Toggle)?,
            "stop" => no_arg("stop", arg, Command::Stop)?,
            "next" => no_arg("next", arg, Command::Next)?,
            "prev" | "previous" => no_arg("prev", arg, Command::Prev)?,
            "status" => no_arg("status", arg, Command::Status)?,
            "list" => no_arg("list", arg, Command::List)?,
            "quit" | "exit" => no_arg("quit", arg, Command::Quit)?,
            "seek" => {
                let position = parse_arg::<f64>("seek", arg)?;
                if !position.is_finite() || position < 0.0 {
                    return Err(CommandError::InvalidArgument {
                        command: "seek",
                        value: position.to_string(),
                    });
                }
                Command::Seek(position)
            }
            "advance" => Command::Advance(parse_arg("advance", arg)?),
            "select" => Command::Select(BeatmapSetId::new(parse_arg("select", arg)?)),
            "repeat" => Command::Repeat(parse_repeat(arg)?),
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        Ok(command)
    }
}

fn no_arg(
    name: &'static str,
    arg: Option<&str>,
    command: Command,
) -> Result<Command, CommandError> {
    match arg {
        Some(_) => Err(CommandError::UnexpectedArgument(name)),
        None => Ok(command),
    }
}

fn parse_arg<T: FromStr>(name: &'static str, arg: Option<&str>) -> Result<T, CommandError> {
    let value = arg.ok_or(CommandError::MissingArgument(name))?;
    value.parse().map_err(|_| CommandError::InvalidArgument {
        command: name,
        value: value.to_string(),
    })
}

fn parse_repeat(arg: Option<&str>) -> Result<RepeatMode, CommandError> {
    let value = arg.ok_or(CommandError::MissingArgument("repeat"))?;

    match value.to_ascii_lowercase().as_str() {
        "none" | "off" => Ok(RepeatMode::None),
        "list" | "all" => Ok(RepeatMode::List),
        "solo" | "one" => Ok(RepeatMode::Solo),
        _ => Err(CommandError::InvalidArgument {
            command: "repeat",
            value: value.to_string(),
        }),
    }
}
