//! Replay a timestamped key script through the chord controller.
//!
//! Script lines look like `120 0+1` (keys 0 and 1 held from t=120 ms),
//! `300 1100000` (same, as a 7-character bit string, key 0 first),
//! `400 -` (nothing held), or `900 disconnect` / `1500 connect` for the
//! host link. `#` starts a comment.

use std::fmt;

use anyhow::{bail, ensure, Context, Result};
use c7k_keymap::{
    Clock, Combo, Device, InputSampler, Keycode, Millis, ModifierKind, OutputSink, Sample, Status,
    StatusDisplay, KEY_COUNT,
};
use tracing::{debug, info, trace};

/// How long the simulated device keeps running after the last script line.
const TAIL_MS: Millis = 1_000;
/// Latest accepted event time, so the run end still fits in `Millis`.
const LAST_EVENT_MS: Millis = Millis::MAX - TAIL_MS;
/// Characters kept on the simulated status line.
const STATUS_LINE_LEN: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    Keys(Combo),
    Connect,
    Disconnect,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Script {
    events: Vec<(Millis, Event)>,
}

impl Script {
    pub fn parse(text: &str) -> Result<Self> {
        let mut events = Vec::new();
        let mut last = 0;
        for (n, raw) in text.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }
            let (at, event) = parse_line(line).with_context(|| format!("line {}: {raw}", n + 1))?;
            ensure!(at >= last, "line {}: time {at} goes backwards", n + 1);
            last = at;
            events.push((at, event));
        }
        ensure!(!events.is_empty(), "script has no events");
        Ok(Self { events })
    }

    pub fn end(&self) -> Millis {
        self.events
            .last()
            .map_or(0, |&(at, _)| at)
            .saturating_add(TAIL_MS)
    }

    /// Latest key event at or before `now`.
    fn keys_at(&self, now: Millis) -> Combo {
        self.events
            .iter()
            .take_while(|&&(at, _)| at <= now)
            .filter_map(|&(_, event)| match event {
                Event::Keys(combo) => Some(combo),
                _ => None,
            })
            .last()
            .unwrap_or(Combo::EMPTY)
    }

    /// Link state at `now`; connected unless a disconnect is in effect.
    fn connected_at(&self, now: Millis) -> bool {
        self.events
            .iter()
            .take_while(|&&(at, _)| at <= now)
            .filter_map(|&(_, event)| match event {
                Event::Connect => Some(true),
                Event::Disconnect => Some(false),
                Event::Keys(_) => None,
            })
            .last()
            .unwrap_or(true)
    }
}

fn parse_line(line: &str) -> Result<(Millis, Event)> {
    let mut parts = line.split_whitespace();
    let at = parts.next().context("missing time")?;
    let at: Millis = at.parse().with_context(|| format!("bad time {at:?}"))?;
    ensure!(at <= LAST_EVENT_MS, "time {at} is past {LAST_EVENT_MS}");
    let what = parts.next().context("missing keys")?;
    if let Some(extra) = parts.next() {
        bail!("unexpected {extra:?}");
    }
    let event = match what {
        "connect" => Event::Connect,
        "disconnect" => Event::Disconnect,
        keys => Event::Keys(parse_keys(keys)?),
    };
    Ok((at, event))
}

fn parse_keys(keys: &str) -> Result<Combo> {
    if keys == "-" {
        return Ok(Combo::EMPTY);
    }
    if keys.len() == KEY_COUNT && keys.chars().all(|c| c == '0' || c == '1') {
        let mut sample = [false; KEY_COUNT];
        for (slot, c) in sample.iter_mut().zip(keys.chars()) {
            *slot = c == '1';
        }
        return Ok(Combo::from_sample(&sample));
    }
    let indices = keys
        .split('+')
        .map(|k| k.parse::<u8>().with_context(|| format!("bad key {k:?}")))
        .collect::<Result<Vec<_>>>()?;
    Combo::try_of(&indices).with_context(|| format!("key index out of range in {keys:?}"))
}

/// One thing the simulated device did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Output {
    Key(Keycode),
    Modified(ModifierKind, Keycode),
    Move(i8, i8),
    Status(Status),
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Key(key) => write!(f, "key     {}", key.name()),
            Output::Modified(kind, key) => write!(f, "key     {}+{}", kind.name(), key.name()),
            Output::Move(dx, dy) => write!(f, "pointer {dx:+},{dy:+}"),
            Output::Status(status) => {
                let text = status.to_string();
                write!(f, "status  {text:?}")
            }
        }
    }
}

/// Simulated board: scripted keys and link, a virtual clock, and a
/// transcript of everything sent.
pub struct SimBoard {
    script: Script,
    now: Millis,
    end: Millis,
    transcript: Vec<(Millis, Output)>,
    status_line: String,
    linked: bool,
}

impl SimBoard {
    pub fn new(script: Script) -> Self {
        let end = script.end();
        Self {
            script,
            now: 0,
            end,
            transcript: Vec::new(),
            status_line: String::new(),
            linked: false,
        }
    }

    pub fn transcript(&self) -> &[(Millis, Output)] {
        &self.transcript
    }

    /// Last few echoed characters, as the device display shows them.
    pub fn status_line(&self) -> &str {
        &self.status_line
    }

    /// Everything typed, in order.
    pub fn typed(&self) -> String {
        self.transcript
            .iter()
            .filter_map(|(_, out)| match out {
                Output::Key(key) => Some(key.echo(None)),
                Output::Modified(kind, key) => Some(key.echo(Some(*kind))),
                _ => None,
            })
            .collect()
    }

    fn record(&mut self, output: Output) {
        info!(at = self.now, %output, "device output");
        self.transcript.push((self.now, output));
    }
}

impl InputSampler for SimBoard {
    fn sample(&mut self) -> Sample {
        let combo = self.script.keys_at(self.now);
        if !combo.is_empty() {
            trace!(at = self.now, %combo, "sample");
        }
        combo.to_sample()
    }
}

impl OutputSink for SimBoard {
    fn is_connected(&mut self) -> bool {
        let linked = self.now < self.end && self.script.connected_at(self.now);
        if linked != self.linked {
            info!(at = self.now, linked, "host link changed");
            self.linked = linked;
        }
        linked
    }

    fn press_and_release_key(&mut self, key: Keycode) {
        self.record(Output::Key(key));
    }

    fn press_and_release_modified_key(&mut self, modifier: ModifierKind, key: Keycode) {
        self.record(Output::Modified(modifier, key));
    }

    fn move_cursor(&mut self, dx: i8, dy: i8) {
        self.record(Output::Move(dx, dy));
    }
}

impl StatusDisplay for SimBoard {
    fn set_status(&mut self, status: &Status) {
        if let Status::Key(c) = status {
            self.status_line.push(*c);
            let excess = self.status_line.chars().count().saturating_sub(STATUS_LINE_LEN);
            self.status_line = self.status_line.chars().skip(excess).collect();
        }
        self.record(Output::Status(*status));
    }
}

impl Clock for SimBoard {
    fn now(&self) -> Millis {
        self.now
    }

    fn delay_ms(&mut self, ms: Millis) {
        debug!(from = self.now, ms, "delay");
        self.now = self.now.saturating_add(ms);
    }
}

impl Device for SimBoard {
    fn is_powered(&mut self) -> bool {
        self.now < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use c7k_keymap::{ChordEngine, ChordTable, Controller, Timing};

    fn run(text: &str) -> SimBoard {
        let table = ChordTable::builtin().unwrap();
        let script = Script::parse(text).unwrap();
        let mut controller = Controller::new(
            ChordEngine::new(&table, Timing::DEFAULT),
            SimBoard::new(script),
        );
        controller.run();
        controller.into_device()
    }

    #[test]
    fn parses_all_key_forms() {
        let script = Script::parse(
            "# header\n\
             0 -\n\
             100 0+1   # r\n\
             200 0011000\n\
             300 disconnect\n\
             400 connect\n",
        )
        .unwrap();
        assert_eq!(
            script.events,
            [
                (0, Event::Keys(Combo::EMPTY)),
                (100, Event::Keys(Combo::of(&[0, 1]))),
                (200, Event::Keys(Combo::of(&[2, 3]))),
                (300, Event::Disconnect),
                (400, Event::Connect),
            ]
        );
        assert_eq!(script.end(), 1_400);
    }

    #[test]
    fn rejects_bad_lines() {
        assert!(Script::parse("").is_err());
        assert!(Script::parse("abc 0").is_err());
        assert!(Script::parse("10 7").is_err());
        assert!(Script::parse("10 0+x").is_err());
        assert!(Script::parse("10 0 1").is_err());
        assert!(Script::parse("10").is_err());
        assert!(Script::parse("20 0\n10 1").is_err());
        assert!(Script::parse("4294967295 -").is_err());
    }

    #[test]
    fn latest_event_time_still_ends() {
        let script = Script::parse(&format!("{LAST_EVENT_MS} -")).unwrap();
        assert_eq!(script.end(), Millis::MAX);
        assert!(Script::parse(&format!("{} -", LAST_EVENT_MS + 1)).is_err());
    }

    #[test]
    fn keys_and_link_follow_the_script() {
        let script = Script::parse("100 0\n200 -\n300 disconnect\n500 connect").unwrap();
        assert_eq!(script.keys_at(50), Combo::EMPTY);
        assert_eq!(script.keys_at(150), Combo::of(&[0]));
        assert_eq!(script.keys_at(250), Combo::EMPTY);
        assert!(script.connected_at(299));
        assert!(!script.connected_at(300));
        assert!(script.connected_at(500));
    }

    #[test]
    fn types_a_word() {
        // "the": t = 2+3, h = 2+5, e = 0
        let board = run("0 -\n100 2+3\n250 -\n350 2+5\n500 -\n600 0\n750 -\n");
        assert_eq!(board.typed(), "the");
        assert_eq!(board.status_line(), "the");
    }

    #[test]
    fn status_line_keeps_last_five() {
        let mut text = String::new();
        for i in 0..7 {
            let at = i * 200;
            text.push_str(&format!("{at} 0\n{} -\n", at + 100));
        }
        let board = run(&text);
        assert_eq!(board.typed(), "eeeeeee");
        assert_eq!(board.status_line(), "eeeee");
    }

    #[test]
    fn bundled_hello_script() {
        let board = run(include_str!("../scripts/hello.txt"));
        assert_eq!(board.typed(), "Hello");
        assert_eq!(board.status_line(), "Hello");
        let moves: Vec<_> = board
            .transcript()
            .iter()
            .filter(|(_, out)| matches!(out, Output::Move(..)))
            .collect();
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].1, Output::Move(10, 0));
    }

    #[test]
    fn transcript_lines() {
        assert_eq!(Output::Key(Keycode::E).to_string(), "key     E");
        assert_eq!(
            Output::Modified(ModifierKind::Shift, Keycode::R).to_string(),
            "key     Shift+R"
        );
        assert_eq!(Output::Move(0, -10).to_string(), "pointer +0,-10");
        assert_eq!(
            Output::Status(Status::MouseLayer(true)).to_string(),
            "status  \"Mouse: on\""
        );
    }

    #[test]
    fn disconnect_drops_layers() {
        let board = run(
            "0 5+6\n100 -\n200 disconnect\n300 connect\n1200 0\n1300 -\n1400 0+1\n1500 -\n",
        );
        // The modifier layer armed before the drop must not apply after it.
        assert_eq!(board.typed(), "er");
        assert!(board
            .transcript()
            .iter()
            .any(|(_, out)| *out == Output::Status(Status::Disconnected)));
    }
}
