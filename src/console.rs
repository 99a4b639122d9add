//! Line commands typed at the console

use rdev::Key;
use std::str::FromStr;

use crate::hotkey::parse_key;
use crate::settings::ClickType;
use crate::AutoclickError;

pub const HELP: &str = "\
Commands:
  start | stop | toggle        control the autoclicker
  rate <min> <sec> <ms>        set the click rate fields
  ok                           apply (validate) the click rate
  hotkey [KEY]                 change the hotkey (no KEY: press the new key)
  freeze on|off                keep the pointer where the run started
  type single|double           click type
  record start|stop            record mouse presses
  recorded                     list recorded clicks
  status                       show current settings
  help                         show this help
  quit                         exit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Stop,
    Toggle,
    Rate {
        minutes: String,
        seconds: String,
        milliseconds: String,
    },
    Apply,
    CaptureHotkey,
    SetHotkey(Key),
    Freeze(bool),
    SetClickType(ClickType),
    RecordStart,
    RecordStop,
    Recorded,
    Status,
    Help,
    Quit,
}

fn on_off(word: &str) -> Result<bool, AutoclickError> {
    match word.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        other => Err(AutoclickError::UnknownCommand(format!(
            "expected on/off, got {:?}",
            other
        ))),
    }
}

impl FromStr for Command {
    type Err = AutoclickError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((name, args)) = words.split_first() else {
            return Err(AutoclickError::UnknownCommand(String::from("empty line")));
        };
        let usage = || AutoclickError::UnknownCommand(line.trim().to_string());

        let command = match (name.to_ascii_lowercase().as_str(), args) {
            ("start", []) => Command::Start,
            ("stop", []) => Command::Stop,
            ("toggle", []) => Command::Toggle,
            // Fields are stored as typed; validation happens on apply and in the loop
            ("rate", [m, s, ms]) => Command::Rate {
                minutes: m.to_string(),
                seconds: s.to_string(),
                milliseconds: ms.to_string(),
            },
            ("ok" | "apply", []) => Command::Apply,
            ("hotkey", []) => Command::CaptureHotkey,
            ("hotkey", [key]) => Command::SetHotkey(parse_key(key)?),
            ("freeze", [flag]) => Command::Freeze(on_off(flag)?),
            ("type", [kind]) => Command::SetClickType(kind.parse()?),
            ("record", [action]) => match action.to_ascii_lowercase().as_str() {
                "start" => Command::RecordStart,
                "stop" => Command::RecordStop,
                _ => return Err(usage()),
            },
            ("recorded", []) => Command::Recorded,
            ("status", []) => Command::Status,
            ("help" | "?", []) => Command::Help,
            ("quit" | "exit", []) => Command::Quit,
            _ => return Err(usage()),
        };
        Ok(command)
    }
}
