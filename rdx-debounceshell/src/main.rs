use anyhow::Result;
use colored::Colorize;
use debounce::prelude::*;
use debounce::{LIBRARY_NAME, VERSION as LIB_VERSION};
use rustyline::highlight::Highlighter;
use rustyline::Editor;
use rustyline_derive::{Completer, Helper, Hinter, Validator};
use slotmap::SlotMap;
use std::borrow::Cow;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;
use tracing_subscriber::EnvFilter;

const SHELL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A custom helper struct for rustyline that enables syntax highlighting.
#[derive(Completer, Helper, Hinter, Validator)]
struct CommandHighlighter;

impl Highlighter for CommandHighlighter {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if let Some((command, rest)) = line.split_once(' ') {
            Cow::Owned(format!("{} {}", command.yellow().bold(), rest.yellow()))
        } else {
            Cow::Owned(line.yellow().bold().to_string())
        }
    }
    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

/// A mounted component: a value debouncer plus the inputs of its last render.
struct Component {
    hook: ValueDebouncer<String>,
    value: String,
    delay: Option<Duration>,
    printer: JoinHandle<()>,
}

impl Component {
    fn mount(handle: usize, delay: Option<Duration>) -> Self {
        let hook = ValueDebouncer::<String>::new();
        let mut commits = hook.subscribe();
        let printer = tokio::spawn(async move {
            while commits.changed().await.is_ok() {
                let value = commits.borrow_and_update().clone();
                println!("\n<-- [COMMIT #{}] {:?}", handle, value);
            }
        });
        Self {
            hook,
            value: String::new(),
            delay,
            printer,
        }
    }

    /// Re-evaluates the component with its current inputs.
    fn render(&mut self) -> String {
        self.hook.use_debounce(self.value.clone(), self.delay)
    }

    fn unmount(self) {
        self.hook.unmount();
        self.printer.abort();
    }
}

/// Handle-addressed registries for everything the shell has created.
#[derive(Default)]
struct ShellState {
    debouncers: SlotMap<DebouncerId, CallDebouncer<Vec<String>>>,
    components: SlotMap<ComponentId, Component>,
    call_handles: HashMap<usize, DebouncerId>,
    component_handles: HashMap<usize, ComponentId>,
    next_handle: usize,
}

impl ShellState {
    fn allocate_handle(&mut self) -> usize {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }

    fn add_call(&mut self, delay: Duration) -> usize {
        let handle = self.allocate_handle();
        let debouncer = debounce(
            move |args: Vec<String>| {
                println!("\n<-- [CALL #{}] fired with {:?}", handle, args);
            },
            delay,
        );
        let id = self.debouncers.insert(debouncer);
        self.call_handles.insert(handle, id);
        handle
    }

    fn call(&self, handle: usize, args: Vec<String>) -> bool {
        match self
            .call_handles
            .get(&handle)
            .and_then(|id| self.debouncers.get(*id))
        {
            Some(debouncer) => {
                debouncer.call(args);
                true
            }
            None => false,
        }
    }

    fn remove_call(&mut self, handle: usize) -> bool {
        self.call_handles
            .remove(&handle)
            .and_then(|id| self.debouncers.remove(id))
            .is_some()
    }

    fn mount(&mut self, delay: Option<Duration>) -> usize {
        let handle = self.allocate_handle();
        let id = self.components.insert(Component::mount(handle, delay));
        self.component_handles.insert(handle, id);
        handle
    }

    fn component_mut(&mut self, handle: usize) -> Option<&mut Component> {
        let id = *self.component_handles.get(&handle)?;
        self.components.get_mut(id)
    }

    fn unmount(&mut self, handle: usize) -> bool {
        match self
            .component_handles
            .remove(&handle)
            .and_then(|id| self.components.remove(id))
        {
            Some(component) => {
                component.unmount();
                true
            }
            None => false,
        }
    }
}

fn print_banner() {
    if env::var("QUIET_MODE").is_ok() {
        return;
    }
    println!("{}", "-".repeat(64).dimmed());
    println!(
        "  {}   Shell v{:<8} Library v{:<8}",
        "debounceshell".cyan().bold(),
        SHELL_VERSION,
        LIB_VERSION
    );
    println!(
        "{}",
        "  Distributed under the MIT OR Apache-2.0 license. Use at your own risk.".dimmed()
    );
    println!("{}", "-".repeat(64).dimmed());
}

fn print_help() {
    println!("Available commands:");
    println!("  add call <MS>         - Creates a call debouncer with an MS delay.");
    println!("  call <H> <ARGS..>     - Invokes call debouncer #H with ARGS.");
    println!("  remove <H>            - Drops call debouncer #H (cancels a pending call).");
    println!("  mount <MS|none>       - Mounts a component holding a value debouncer.");
    println!("  type <H> <TEXT>       - Re-renders component #H with TEXT as its input.");
    println!("  delay <H> <MS|none>   - Re-renders component #H with a new delay.");
    println!("  unmount <H>           - Unmounts component #H (discards a pending commit).");
    println!("  list                  - Shows debouncers, components and their handles.");
    println!("  exit                  - Quits the shell.");
}

fn parse_delay(arg: Option<&&str>) -> Option<Option<Duration>> {
    match arg {
        Some(&"none") => Some(None),
        Some(ms) => ms.parse::<u64>().ok().map(|ms| Some(Duration::from_millis(ms))),
        None => None,
    }
}

fn parse_handle(arg: Option<&&str>) -> Option<usize> {
    arg.and_then(|h| h.trim_start_matches('#').parse().ok())
}

#[tokio::main]
async fn main() -> Result<()> {
    print_banner();

    let config_path = env::var_os("RDX_DEBOUNCE_CONFIG").map(PathBuf::from);
    let config = DebounceConfig::load(config_path.as_deref())?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!(
        "{} ready (call delay {:?}, value delay {:?}).",
        LIBRARY_NAME.cyan(),
        config.call_delay(),
        config.value_delay()
    );

    let mut state = ShellState::default();
    let mut rl = Editor::new()?;
    rl.set_helper(Some(CommandHighlighter));

    println!("Type 'help' for commands or 'exit' to quit.");

    loop {
        let prompt = format!("{}", ">> ".cyan().bold());
        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(_) => {
                println!("Exiting debounceshell...");
                break;
            }
        };
        rl.add_history_entry(line.as_str())?;
        let args = line.split_whitespace().collect::<Vec<_>>();
        let Some(command) = args.first() else {
            continue;
        };

        match *command {
            "add" => match (args.get(1), args.get(2)) {
                (Some(&"call"), delay) => {
                    let delay = match delay {
                        Some(ms) => ms.parse::<u64>().ok().map(Duration::from_millis),
                        None => Some(config.call_delay()),
                    };
                    match delay {
                        Some(delay) => {
                            let handle = state.add_call(delay);
                            println!("--> Added call debouncer #{} ({:?}).", handle, delay);
                        }
                        None => println!("Usage: add call <MS>"),
                    }
                }
                _ => println!("Unknown 'add' command. Try 'add call'."),
            },
            "call" => match parse_handle(args.get(1)) {
                Some(handle) => {
                    let call_args = args[2..].iter().map(|a| a.to_string()).collect();
                    if !state.call(handle, call_args) {
                        println!("Error: Invalid handle #{}. Use 'list'.", handle);
                    }
                }
                None => println!("Usage: call <H> <ARGS..>"),
            },
            "remove" => match parse_handle(args.get(1)) {
                Some(handle) if state.remove_call(handle) => {
                    println!("--> Call debouncer #{} removed.", handle)
                }
                Some(handle) => println!("Error: Invalid handle #{}.", handle),
                None => println!("Usage: remove <H>"),
            },
            "mount" => {
                let delay = if args.len() > 1 {
                    parse_delay(args.get(1))
                } else {
                    Some(config.value_delay())
                };
                match delay {
                    Some(delay) => {
                        let handle = state.mount(delay);
                        println!("--> Mounted component #{} ({:?}).", handle, delay);
                    }
                    None => println!("Usage: mount <MS|none>"),
                }
            }
            "type" => {
                let text = line
                    .split_whitespace()
                    .skip(2)
                    .collect::<Vec<_>>()
                    .join(" ");
                match parse_handle(args.get(1)).and_then(|h| state.component_mut(h)) {
                    Some(component) => {
                        component.value = text;
                        let shown = component.render();
                        println!("--> Rendered, showing {:?}.", shown);
                    }
                    None => println!("Usage: type <H> <TEXT> (see 'list' for handles)"),
                }
            }
            "delay" => {
                let delay = parse_delay(args.get(2));
                match (parse_handle(args.get(1)), delay) {
                    (Some(handle), Some(delay)) => match state.component_mut(handle) {
                        Some(component) => {
                            component.delay = delay;
                            let shown = component.render();
                            println!("--> Delay now {:?}, showing {:?}.", delay, shown);
                        }
                        None => println!("Error: Invalid handle #{}.", handle),
                    },
                    _ => println!("Usage: delay <H> <MS|none>"),
                }
            }
            "unmount" => match parse_handle(args.get(1)) {
                Some(handle) if state.unmount(handle) => {
                    println!("--> Component #{} unmounted.", handle)
                }
                Some(handle) => println!("Error: Invalid handle #{}.", handle),
                None => println!("Usage: unmount <H>"),
            },
            "list" => {
                println!("Call debouncers:");
                for (handle, id) in &state.call_handles {
                    if let Some(debouncer) = state.debouncers.get(*id) {
                        println!(
                            "  #{} {:?} delay={:?} pending={}",
                            handle,
                            id,
                            debouncer.delay(),
                            debouncer.is_pending()
                        );
                    }
                }
                println!("Components:");
                for (handle, id) in &state.component_handles {
                    if let Some(component) = state.components.get(*id) {
                        println!(
                            "  #{} {:?} input={:?} shown={:?} pending={}",
                            handle,
                            id,
                            component.value,
                            component.hook.value(),
                            component.hook.is_pending()
                        );
                    }
                }
            }
            "help" => print_help(),
            "exit" => break,
            _ => println!("Unknown command: '{}'. Type 'help'.", line),
        }
    }

    for (_, component) in state.components.drain() {
        component.unmount();
    }
    Ok(())
}
