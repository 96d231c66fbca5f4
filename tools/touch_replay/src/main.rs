use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use uiswitch::{
    ControllerOutput, HoldToken, HostEnvironment, PointerEvent, PointerKind, SwitchConfig,
    SwitchHost, ToggleController,
};

/// Replay horizon after the last trace line so pending timers and springs
/// can finish.
const TAIL_MS: u64 = 5_000;

#[derive(Debug, Parser)]
#[command(name = "touch_replay")]
#[command(about = "Replay a pointer trace through the switch controller")]
struct Cli {
    trace: PathBuf,
    #[arg(long)]
    config: Option<PathBuf>,
    /// Start in the checked state.
    #[arg(long)]
    checked: bool,
    /// Expected effect labels, one per line.
    #[arg(long)]
    expect: Option<PathBuf>,
    #[arg(long = "frame-ms", default_value_t = 16)]
    frame_ms: u64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum TraceAction {
    Pointer(PointerEvent),
    Checked(bool),
    Enabled(bool),
    Size(f32, f32),
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct TraceStep {
    ms: u64,
    action: TraceAction,
}

/// Virtual scheduler and redraw flag standing in for a UI host.
#[derive(Debug, Default)]
struct VirtualHost {
    now_ms: u64,
    pending: Vec<(HoldToken, u64)>,
    dirty: bool,
}

impl SwitchHost for VirtualHost {
    fn request_redraw(&mut self) {
        self.dirty = true;
    }

    fn play_toggle_feedback(&mut self) {
        log::trace!("replay feedback ms={}", self.now_ms);
    }

    fn request_ancestor_gesture_lock(&mut self, locked: bool) {
        log::trace!("replay ancestor_lock ms={} locked={locked}", self.now_ms);
    }

    fn on_checked_changed(&mut self, checked: bool) {
        log::debug!("replay checked_changed ms={} checked={checked}", self.now_ms);
    }

    fn schedule_hold(&mut self, token: HoldToken, delay: Duration) {
        let due = self.now_ms + delay.as_millis() as u64;
        self.pending.push((token, due));
    }

    fn cancel_hold(&mut self, token: HoldToken) {
        self.pending.retain(|(pending, _)| *pending != token);
    }
}

impl VirtualHost {
    fn take_due(&mut self) -> Option<HoldToken> {
        let now = self.now_ms;
        let index = self.pending.iter().position(|(_, due)| *due <= now)?;
        Some(self.pending.remove(index).0)
    }
}

struct Replay {
    controller: ToggleController,
    host: VirtualHost,
    frame_ms: u64,
    next_frame_ms: u64,
    rows: Vec<String>,
    labels: Vec<&'static str>,
}

impl Replay {
    fn new(controller: ToggleController, frame_ms: u64) -> Self {
        let mut replay = Self {
            controller,
            host: VirtualHost::default(),
            frame_ms: frame_ms.max(1),
            next_frame_ms: 0,
            rows: Vec::new(),
            labels: Vec::new(),
        };
        let attached = replay.controller.on_attached();
        replay.apply(&attached);
        replay
    }

    fn apply(&mut self, output: &ControllerOutput) {
        for effect in output.iter() {
            self.rows
                .push(format!("effect,{},{}", self.host.now_ms, effect.label()));
            self.labels.push(effect.label());
        }
        output.dispatch(&mut self.host);
    }

    fn step(&mut self, step: TraceStep) {
        self.advance_to(step.ms);
        let output = match step.action {
            TraceAction::Pointer(event) => self.controller.on_pointer_event(event),
            TraceAction::Checked(checked) => self.controller.set_checked(checked),
            TraceAction::Enabled(enabled) => self.controller.set_enabled(enabled),
            TraceAction::Size(width, height) => self.controller.on_size_changed(width, height),
        };
        self.apply(&output);
    }

    /// Runs frames and due timers up to and including `target_ms`.
    fn advance_to(&mut self, target_ms: u64) {
        while self.next_frame_ms <= target_ms {
            self.host.now_ms = self.host.now_ms.max(self.next_frame_ms);
            self.fire_due_timers();
            self.render_frame();
            self.next_frame_ms += self.frame_ms;
        }
        self.host.now_ms = self.host.now_ms.max(target_ms);
        self.fire_due_timers();
    }

    fn finish(&mut self) {
        let horizon = self.host.now_ms + TAIL_MS;
        while self.next_frame_ms <= horizon
            && (self.controller.is_animating() || !self.host.pending.is_empty())
        {
            let next = self.next_frame_ms;
            self.advance_to(next);
        }
        if self.controller.is_animating() {
            log::warn!("replay still animating at ms={}", self.host.now_ms);
        }
    }

    fn fire_due_timers(&mut self) {
        while let Some(token) = self.host.take_due() {
            let output = self.controller.on_hold_timer(token);
            self.apply(&output);
        }
    }

    fn render_frame(&mut self) {
        let output = self
            .controller
            .on_frame(Duration::from_millis(self.host.now_ms));
        output.dispatch(&mut self.host);
        if !std::mem::take(&mut self.host.dirty) {
            return;
        }
        let state = self.controller.state();
        let thumb = state.thumb_position();
        self.rows.push(format!(
            "frame,{},{},{},{:.4},{:.4},{:.4}",
            self.host.now_ms,
            state.checked(),
            state.substate().label(),
            thumb.left,
            thumb.right,
            state.track_tint_fraction()
        ));
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err:?}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => SwitchConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SwitchConfig::default(),
    };
    let text = fs::read_to_string(&cli.trace)
        .with_context(|| format!("failed to open {}", cli.trace.display()))?;
    let steps = parse_trace(&text, &cli.trace)?;

    let controller = ToggleController::new(config, HostEnvironment::default(), cli.checked);
    let replay = replay(controller, cli.frame_ms, &steps);
    for row in &replay.rows {
        println!("{row}");
    }

    if let Some(expect_path) = &cli.expect {
        let text = fs::read_to_string(expect_path)
            .with_context(|| format!("failed to open {}", expect_path.display()))?;
        let expected = parse_expected_labels(&text, expect_path)?;
        if replay.labels != expected {
            eprintln!("expected effects: {}", expected.join(","));
            eprintln!("actual effects:   {}", replay.labels.join(","));
            bail!("effect sequence mismatch");
        }
    }
    Ok(())
}

fn replay(controller: ToggleController, frame_ms: u64, steps: &[TraceStep]) -> Replay {
    let mut replay = Replay::new(controller, frame_ms);
    for step in steps {
        replay.step(*step);
    }
    replay.finish();
    replay
}

fn parse_trace(text: &str, path: &Path) -> Result<Vec<TraceStep>> {
    let mut steps = Vec::new();
    let mut last_ms = 0;
    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("ms,") {
            continue;
        }
        let step = parse_trace_line(trimmed)
            .with_context(|| format!("{}:{line_no} invalid trace line", path.display()))?;
        if step.ms < last_ms {
            bail!(
                "{}:{line_no} timestamp {} goes backwards (previous {last_ms})",
                path.display(),
                step.ms
            );
        }
        last_ms = step.ms;
        steps.push(step);
    }
    Ok(steps)
}

fn parse_trace_line(line: &str) -> Result<TraceStep> {
    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    if parts.len() < 2 {
        bail!("expected at least `ms,kind`");
    }
    let ms = parts[0]
        .parse::<u64>()
        .with_context(|| format!("invalid ms '{}'", parts[0]))?;
    let args = &parts[2..];

    let action = match parts[1].to_ascii_lowercase().as_str() {
        "down" => TraceAction::Pointer(pointer(PointerKind::Down, args)?),
        "move" => TraceAction::Pointer(pointer(PointerKind::Move, args)?),
        "up" => TraceAction::Pointer(pointer(PointerKind::Up, args)?),
        "cancel" => TraceAction::Pointer(pointer(PointerKind::Cancel, args)?),
        "checked" => TraceAction::Checked(parse_bool(single(args, "checked")?)?),
        "enabled" => TraceAction::Enabled(parse_bool(single(args, "enabled")?)?),
        "size" => {
            let [width, height] = args else {
                bail!("size expects `w,h`");
            };
            TraceAction::Size(parse_f32(width, "width")?, parse_f32(height, "height")?)
        }
        other => bail!("unknown kind '{other}'"),
    };
    Ok(TraceStep { ms, action })
}

/// Coordinates default to the origin when omitted.
fn pointer(kind: PointerKind, args: &[&str]) -> Result<PointerEvent> {
    let (x, y) = match args {
        [] => (0.0, 0.0),
        [x, y] => (parse_f32(x, "x")?, parse_f32(y, "y")?),
        _ => bail!("pointer events take `x,y` or nothing"),
    };
    Ok(PointerEvent::new(kind, x, y))
}

fn single<'a>(args: &[&'a str], field: &str) -> Result<&'a str> {
    match args {
        [value] => Ok(*value),
        _ => bail!("{field} expects exactly one value"),
    }
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => bail!("invalid bool '{raw}'"),
    }
}

fn parse_f32(raw: &str, field: &str) -> Result<f32> {
    raw.parse::<f32>()
        .with_context(|| format!("invalid {field} '{raw}'"))
}

fn parse_expected_labels(text: &str, path: &Path) -> Result<Vec<&'static str>> {
    let mut labels = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let token = line.trim();
        if token.is_empty() || token.starts_with('#') {
            continue;
        }
        let Some(label) = normalize_label(token) else {
            bail!(
                "{}:{} invalid expected effect: {token}",
                path.display(),
                index + 1
            );
        };
        labels.push(label);
    }
    Ok(labels)
}

fn normalize_label(label: &str) -> Option<&'static str> {
    match label.to_ascii_lowercase().as_str() {
        "redraw" => Some("redraw"),
        "feedback" => Some("feedback"),
        "lock" => Some("lock"),
        "unlock" => Some("unlock"),
        "checked" => Some("checked"),
        "unchecked" => Some("unchecked"),
        "schedule_hold" => Some("schedule_hold"),
        "cancel_hold" => Some("cancel_hold"),
        _ => None,
    }
}
