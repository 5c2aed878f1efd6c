//! Command dispatch: each subcommand drives one session through the container.

use std::io::{self, BufRead};
use std::path::Path;
use std::time::Duration;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::{RenderSurface, Session};
use crate::cli::args::{Cli, Commands, ConfigCommands, TreeInput};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::cli::surface::TerminalSurface;
use crate::config::{global_config_path, Settings};
use crate::domain::{
    generate_trace, parse_array, InputMode, TraceAlgorithm, TraversalKind, TreeNodeConvert,
};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli, container: &ServiceContainer) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Build { input }) => cmd_build(container, input),
        Some(Commands::Traverse { input, kind }) => cmd_traverse(container, input, *kind),
        Some(Commands::Layout {
            input,
            viewport,
            json,
        }) => cmd_layout(container, input, *viewport, *json),
        Some(Commands::Trace { input, algo, json }) => cmd_trace(container, input, *algo, *json),
        Some(Commands::Play {
            input,
            kind,
            trace,
            manual,
            interval,
        }) => cmd_play(container, input, *kind, *trace, *manual, *interval),
        Some(Commands::Save { array, slot }) => cmd_save(container, array, slot),
        Some(Commands::Import { slot, mode }) => cmd_import(container, slot, *mode),
        Some(Commands::Config { command }) => cmd_config(container, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            generate(*shell, &mut cmd, "treewalk", &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see `treewalk --help`".to_string(),
        )),
    }
}

/// Fresh session with the tree from `input` already built.
fn built_session(container: &ServiceContainer, input: &TreeInput) -> CliResult<Session> {
    let mut session = container.session();
    let mode = input.mode.unwrap_or(session.default_mode());
    session.build(&input.array, mode)?;
    Ok(session)
}

fn print_tree(session: &Session) {
    output::info(&session.tree().to_tree_string());
    output::detail(&format!(
        "nodes: {}, height: {}",
        session.tree().len(),
        session.tree().height()
    ));
}

#[instrument(skip(container))]
fn cmd_build(container: &ServiceContainer, input: &TreeInput) -> CliResult<()> {
    let session = built_session(container, input)?;
    print_tree(&session);
    Ok(())
}

#[instrument(skip(container))]
fn cmd_traverse(
    container: &ServiceContainer,
    input: &TreeInput,
    kind: Option<TraversalKind>,
) -> CliResult<()> {
    let session = built_session(container, input)?;
    let kinds = match kind {
        Some(kind) => vec![kind],
        None => TraversalKind::ALL.to_vec(),
    };
    for kind in kinds {
        output::action(&format!("{:<10}", kind.to_string()), &session.traversals().format(kind));
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_layout(
    container: &ServiceContainer,
    input: &TreeInput,
    viewport: Option<f64>,
    json: bool,
) -> CliResult<()> {
    let mut session = built_session(container, input)?;
    if let Some(width) = viewport {
        session.set_viewport_width(width);
    }
    let layout = session.layout();

    if json {
        let text = serde_json::to_string_pretty(layout).map_err(|e| InfraError::Serialize {
            message: e.to_string(),
        })?;
        output::info(&text);
        return Ok(());
    }

    let (width, height) = layout.canvas();
    output::header(&format!("canvas {:.0} x {:.0}", width, height));
    for position in layout.iter() {
        let value = session
            .tree()
            .node(position.node_id)
            .map(|n| n.value.to_string())
            .unwrap_or_default();
        output::detail(&format!(
            "#{:<3} {:>6}  x={:>8.1}  y={:>6.1}  depth {}",
            position.node_id, value, position.x, position.y, position.depth
        ));
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_trace(
    container: &ServiceContainer,
    input: &TreeInput,
    algo: TraceAlgorithm,
    json: bool,
) -> CliResult<()> {
    let session = built_session(container, input)?;
    let trace = generate_trace(session.tree(), algo);

    if json {
        let text = serde_json::to_string_pretty(trace.events()).map_err(|e| {
            InfraError::Serialize {
                message: e.to_string(),
            }
        })?;
        output::info(&text);
        return Ok(());
    }

    output::header(&format!("{} trace: {} events", algo, trace.len()));
    for event in trace.events() {
        let value = trace
            .value_of(event.node_id)
            .map(|v| v.to_string())
            .unwrap_or_default();
        output::info(&format!(
            "{:>4}  {}{}({})",
            event.sequence_index,
            "  ".repeat(event.depth),
            event.phase,
            value
        ));
    }
    let flow: Vec<String> = trace
        .processed()
        .into_iter()
        .filter_map(|id| trace.value_of(id).map(|v| v.to_string()))
        .collect();
    output::action("flow", &format!("[{}]", flow.join(",")));
    Ok(())
}

#[instrument(skip(container))]
fn cmd_play(
    container: &ServiceContainer,
    input: &TreeInput,
    kind: TraversalKind,
    trace: Option<TraceAlgorithm>,
    manual: bool,
    interval: Option<u64>,
) -> CliResult<()> {
    let mut session = built_session(container, input)?;
    if session.tree().is_empty() {
        output::warning("empty tree, nothing to play");
        return Ok(());
    }
    if let Some(ms) = interval {
        session.set_interval(Duration::from_millis(ms));
    }

    match trace {
        Some(algo) => session.start_trace(algo),
        None => session.start(kind),
    };

    let mut surface = TerminalSurface::new(session.tree().clone());
    session.render_to(&mut surface);

    if manual {
        session.pause();
        step_interactively(&mut session, &mut surface)?;
    } else {
        let applied = session.run_automatic(container.ticker.as_ref(), &mut surface);
        debug!("cmd_play: {} automatic steps", applied);
    }

    output::success(&format!("{} after {} frames", session.state(), surface.frames()));
    Ok(())
}

/// Read lines from stdin: Enter steps, `q` quits.
fn step_interactively(
    session: &mut Session,
    surface: &mut dyn RenderSurface<i64>,
) -> CliResult<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        output::prompt("[Enter] step  [q] quit:");
        let Some(line) = lines.next() else {
            return Ok(());
        };
        let line = line.map_err(|e| InfraError::io("read stdin", e))?;
        match line.trim() {
            "q" => return Ok(()),
            _ => match session.step() {
                Some(effect) => {
                    session.render_to(surface);
                    if effect.completed {
                        return Ok(());
                    }
                }
                None => return Ok(()),
            },
        }
    }
}

#[instrument(skip(container))]
fn cmd_save(container: &ServiceContainer, array: &str, slot: &str) -> CliResult<()> {
    let values = parse_array(array)?;
    let mut session = container.session();
    session.build_values(&values, session.default_mode());
    session.export_to(container.slots.as_ref(), slot)?;
    output::success(&format!("saved {} values to slot {}", values.len(), slot));
    Ok(())
}

#[instrument(skip(container))]
fn cmd_import(
    container: &ServiceContainer,
    slot: &str,
    mode: Option<InputMode>,
) -> CliResult<()> {
    let mut session = container.session();
    let mode = mode.unwrap_or(session.default_mode());
    match session.import_from(container.slots.as_ref(), slot, mode)? {
        Some(_) => {
            output::action("imported", &session.last_input().unwrap_or_default());
            print_tree(&session);
        }
        None => output::warning(&format!("no saved tree in slot {}", slot)),
    }
    Ok(())
}

fn cmd_config(container: &ServiceContainer, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&container.settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("global", &path.display()),
                None => output::warning("no config directory on this platform"),
            }
            output::action("slots", &container.settings.slots_dir().display());
            Ok(())
        }
        ConfigCommands::Init { path, force } => {
            let target = match path {
                Some(p) => p.clone(),
                None => global_config_path().ok_or_else(|| {
                    CliError::Usage("no config directory, pass a path".to_string())
                })?,
            };
            write_template(&target, *force)?;
            output::success(&format!("wrote {}", target.display()));
            Ok(())
        }
    }
}

fn write_template(target: &Path, force: bool) -> CliResult<()> {
    if target.exists() && !force {
        return Err(CliError::Usage(format!(
            "{} exists, use --force to overwrite",
            target.display()
        )));
    }
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| InfraError::io(format!("create {}", parent.display()), e))?;
    }
    std::fs::write(target, Settings::template())
        .map_err(|e| InfraError::io(format!("write {}", target.display()), e))?;
    Ok(())
}
