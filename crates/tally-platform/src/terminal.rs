//! Line-oriented terminal front-end for [`App`].

use std::io::{self, BufRead, Write};
use std::str::FromStr;

use anyhow::{Context, anyhow, bail};
use tally_core::{Role, Scheduler, View, ViewId};
use tally_devtools::Inspector;

use crate::{App, HeadlessChrome, RunnerConfig};

const HELP: &str = "\
commands:
  show               print the current frame
  tree               list semantics nodes
  click [#id|tag]    click a view (default: focused)
  type <text>        type at the caret of the focused field
  set <text>         replace the focused field's value
  back               delete one grapheme before the caret
  tab                move focus to the next view
  inspect            toggle the frame HUD
  title              print the window title
  help               this text
  quit               unmount and exit";

/// Where a command is aimed: a stamped id (`#3`) or a test tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Id(ViewId),
    Tag(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Show,
    Tree,
    Click(Option<Target>),
    Type(String),
    Set(String),
    Back,
    Tab,
    Inspect,
    Title,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> anyhow::Result<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (word, rest) = match line.split_once(' ') {
            Some((w, r)) => (w, r),
            None => (line, ""),
        };
        let cmd = match word {
            "show" => Command::Show,
            "tree" => Command::Tree,
            "click" => Command::Click(match rest.trim() {
                "" => None,
                t => Some(parse_target(t)?),
            }),
            "type" => Command::Type(rest.to_string()),
            "set" => Command::Set(rest.to_string()),
            "back" => Command::Back,
            "tab" => Command::Tab,
            "inspect" => Command::Inspect,
            "title" => Command::Title,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => bail!("unknown command '{other}' (try 'help')"),
        };
        Ok(cmd)
    }
}

fn parse_target(s: &str) -> anyhow::Result<Target> {
    match s.strip_prefix('#') {
        Some(id) => Ok(Target::Id(
            id.parse().with_context(|| format!("bad view id '{s}'"))?,
        )),
        None => Ok(Target::Tag(s.to_string())),
    }
}

fn resolve(app: &mut App, target: Option<Target>) -> anyhow::Result<ViewId> {
    match target {
        Some(Target::Id(id)) => Ok(id),
        Some(Target::Tag(tag)) => app.find_tag(&tag),
        None => app
            .focused()
            .ok_or_else(|| anyhow!("nothing is focused; name a target or press 'tab'")),
    }
}

/// The focused text field, or the first one in the frame.
fn text_target(app: &mut App) -> anyhow::Result<ViewId> {
    let focused = app.focused();
    let frame = app.frame()?;
    if let Some(id) = focused
        && frame.semantics(id).is_some_and(|n| n.role == Role::TextField)
    {
        return Ok(id);
    }
    frame
        .find_by_role(Role::TextField)
        .next()
        .map(|n| n.id)
        .ok_or_else(|| anyhow!("no text field in the current frame"))
}

fn print_frame(app: &mut App, out: &mut impl Write) -> anyhow::Result<()> {
    let scene = app.scene_text()?;
    writeln!(out, "== {} ==", app.title())?;
    write!(out, "{scene}")?;
    Ok(())
}

/// Runs one command. Returns false when the session should end.
fn execute(app: &mut App, cmd: Command, out: &mut impl Write) -> anyhow::Result<bool> {
    match cmd {
        Command::Show => print_frame(app, out)?,
        Command::Tree => {
            let frame = app.frame()?;
            write!(out, "{}", Inspector::describe(frame))?;
        }
        Command::Click(target) => {
            let id = resolve(app, target)?;
            app.click(id)?;
        }
        Command::Type(text) => {
            let id = text_target(app)?;
            app.type_text(id, &text)?;
        }
        Command::Set(text) => {
            let id = text_target(app)?;
            app.set_text(id, &text)?;
        }
        Command::Back => {
            let id = text_target(app)?;
            app.backspace(id)?;
        }
        Command::Tab => {
            if app.focus_next()?.is_none() {
                writeln!(out, "nothing to focus")?;
            }
        }
        Command::Inspect => app.inspector_mut().hud.toggle_inspector(),
        Command::Title => writeln!(out, "{}", app.title())?,
        Command::Help => writeln!(out, "{HELP}")?,
        Command::Quit => return Ok(false),
    }
    Ok(true)
}

/// Drives `root` from `input` until EOF or `quit`, writing frames to `out`.
/// Command errors are reported and the session continues.
pub fn run_with_io(
    root: impl FnMut(&mut Scheduler) -> View + 'static,
    config: &RunnerConfig,
    input: impl BufRead,
    mut out: impl Write,
) -> anyhow::Result<()> {
    let mut app = App::new(root, HeadlessChrome::new(config.title.clone())).with_config(config);
    log::info!("mounting root view");
    print_frame(&mut app, &mut out)?;

    for line in input.lines() {
        let line = line.context("reading command")?;
        if line.trim().is_empty() {
            continue;
        }
        let result = line
            .parse::<Command>()
            .and_then(|cmd| {
                let echo = config.echo_frames
                    && !matches!(
                        cmd,
                        Command::Show | Command::Tree | Command::Help | Command::Title
                    );
                execute(&mut app, cmd, &mut out).map(|go_on| (go_on, echo))
            });
        match result {
            Ok((false, _)) => break,
            Ok((true, echo)) => {
                if echo {
                    print_frame(&mut app, &mut out)?;
                }
            }
            Err(e) => {
                log::warn!("command '{line}' failed: {e:#}");
                writeln!(out, "error: {e:#}")?;
            }
        }
        if !config.prompt.is_empty() {
            write!(out, "{}", config.prompt)?;
            out.flush()?;
        }
    }

    app.unmount();
    log::info!("root view unmounted");
    Ok(())
}

pub fn run_terminal_app(
    root: impl FnMut(&mut Scheduler) -> View + 'static,
    config: &RunnerConfig,
) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_with_io(root, config, stdin.lock(), stdout.lock())
}
