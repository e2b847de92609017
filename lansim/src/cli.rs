//! Router-style command interpreter.
//!
//! A [`Session`] holds a network, the device whose console is attached, and the current
//! [`Mode`]. Each line goes through three stages: tokenizing, a mode check on the command
//! keyword, then argument parsing. Only a command that passes all three touches the network.
//! A failed command leaves the mode and console as they were and is written to the console
//! device's error log.

use std::fmt::{Display, Formatter};

use crate::concepts::device::{DeviceKind, DeviceStatus};
use crate::concepts::interface::AdminState;
use crate::concepts::policy::{PolicyAction, Prefix};
use crate::feedback::{Error, ModeError, StructuralError, ValidationError};
use crate::network::Network;
use crate::report;
use crate::sim::TickEvent;
use crate::util::{is_valid_interface_name, parse_address, parse_ttl};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    User,
    Privileged,
    GlobalConfig,
    InterfaceConfig { interface: String },
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::User => "user",
            Mode::Privileged => "privileged",
            Mode::GlobalConfig => "global configuration",
            Mode::InterfaceConfig { .. } => "interface configuration",
        }
    }

    fn prompt_suffix(&self) -> &'static str {
        match self {
            Mode::User => ">",
            Mode::Privileged => "#",
            Mode::GlobalConfig => "(config)#",
            Mode::InterfaceConfig { .. } => "(config-if)#",
        }
    }
}

/// What a successful command hands back to the shell
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Silent,
    Message(String),
    Report(String),
    Events(Vec<TickEvent>),
    Quit,
}

impl Display for Reply {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Reply::Silent | Reply::Quit => Ok(()),
            Reply::Message(text) | Reply::Report(text) => f.write_str(text),
            Reply::Events(events) if events.is_empty() => f.write_str("No packets to process"),
            Reply::Events(events) => {
                for (i, event) in events.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "[Tick {}] {event}", event.tick)?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShowTarget {
    History(Option<String>),
    Queue(Option<String>),
    Interfaces(Option<String>),
    Statistics,
    ErrorLog(Option<usize>),
    RunningConfig,
    Policies(Option<String>),
}

/// Arguments of `connect` and `disconnect`, the local side is the console device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkArgs {
    pub local_interface: String,
    pub device: String,
    pub remote_interface: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Enable,
    Disable,
    ConfigureTerminal,
    Console(String),
    Send {
        destination: String,
        message: String,
        ttl: Option<String>,
    },
    Tick(usize),
    ListDevices,
    Show(ShowTarget),
    Connect(LinkArgs),
    Disconnect(LinkArgs),
    SetDeviceStatus {
        device: String,
        status: DeviceStatus,
    },
    SaveConfig(Option<String>),
    LoadConfig(String),
    Hostname(String),
    Interface(String),
    AddDevice {
        hostname: String,
        kind: DeviceKind,
    },
    AddInterface(String),
    RemoveDevice(String),
    SetPolicy {
        prefix: Prefix,
        action: PolicyAction,
    },
    UnsetPolicy(Prefix),
    IpAddress(String),
    Shutdown,
    NoShutdown,
    Exit,
    End,
    Help,
    Quit,
}

/// Command keywords, the unit at which modes grant access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    Enable,
    Disable,
    Configure,
    Console,
    Send,
    Tick,
    ListDevices,
    Show,
    Connect,
    Disconnect,
    SetDeviceStatus,
    Save,
    Load,
    Hostname,
    Interface,
    Add,
    Remove,
    Policy,
    Ip,
    Shutdown,
    No,
    Exit,
    End,
    Help,
    Quit,
}

const VERBS: [Verb; 25] = [
    Verb::Enable,
    Verb::Disable,
    Verb::Configure,
    Verb::Console,
    Verb::Send,
    Verb::Tick,
    Verb::ListDevices,
    Verb::Show,
    Verb::Connect,
    Verb::Disconnect,
    Verb::SetDeviceStatus,
    Verb::Save,
    Verb::Load,
    Verb::Hostname,
    Verb::Interface,
    Verb::Add,
    Verb::Remove,
    Verb::Policy,
    Verb::Ip,
    Verb::Shutdown,
    Verb::No,
    Verb::Exit,
    Verb::End,
    Verb::Help,
    Verb::Quit,
];

impl Verb {
    fn lookup(word: &str) -> Option<Verb> {
        Some(match word {
            "enable" => Verb::Enable,
            "disable" => Verb::Disable,
            "configure" => Verb::Configure,
            "console" => Verb::Console,
            "send" => Verb::Send,
            "tick" | "process" => Verb::Tick,
            "list_devices" => Verb::ListDevices,
            "show" => Verb::Show,
            "connect" => Verb::Connect,
            "disconnect" => Verb::Disconnect,
            "set_device_status" => Verb::SetDeviceStatus,
            "save" => Verb::Save,
            "load" => Verb::Load,
            "hostname" => Verb::Hostname,
            "interface" => Verb::Interface,
            "add" => Verb::Add,
            "remove" => Verb::Remove,
            "policy" => Verb::Policy,
            "ip" => Verb::Ip,
            "shutdown" => Verb::Shutdown,
            "no" => Verb::No,
            "exit" => Verb::Exit,
            "end" => Verb::End,
            "help" | "?" => Verb::Help,
            "quit" => Verb::Quit,
            _ => return None,
        })
    }

    fn allowed_in(self, mode: &Mode) -> bool {
        use Verb::*;
        match mode {
            Mode::User => matches!(
                self,
                Enable | Console | Send | Tick | ListDevices | Show | Exit | Help | Quit
            ),
            Mode::Privileged => matches!(
                self,
                Disable
                    | Configure
                    | Console
                    | Send
                    | Tick
                    | ListDevices
                    | Show
                    | Connect
                    | Disconnect
                    | SetDeviceStatus
                    | Save
                    | Load
                    | Exit
                    | Help
                    | Quit
            ),
            Mode::GlobalConfig => matches!(
                self,
                Hostname | Interface | Add | Remove | Policy | Exit | End | Help | Quit
            ),
            Mode::InterfaceConfig { .. } => {
                matches!(self, Ip | Shutdown | No | Exit | End | Help | Quit)
            }
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            Verb::Enable => "enable",
            Verb::Disable => "disable",
            Verb::Configure => "configure terminal",
            Verb::Console => "console",
            Verb::Send => "send",
            Verb::Tick => "tick",
            Verb::ListDevices => "list_devices",
            Verb::Show => "show",
            Verb::Connect => "connect",
            Verb::Disconnect => "disconnect",
            Verb::SetDeviceStatus => "set_device_status",
            Verb::Save => "save running-config",
            Verb::Load => "load config",
            Verb::Hostname => "hostname",
            Verb::Interface => "interface",
            Verb::Add => "add",
            Verb::Remove => "remove device",
            Verb::Policy => "policy",
            Verb::Ip => "ip address",
            Verb::Shutdown => "shutdown",
            Verb::No => "no shutdown",
            Verb::Exit => "exit",
            Verb::End => "end",
            Verb::Help => "help",
            Verb::Quit => "quit",
        }
    }

    fn usage(self) -> &'static str {
        match self {
            Verb::Enable => "enable",
            Verb::Disable => "disable",
            Verb::Configure => "configure terminal",
            Verb::Console => "console <device>",
            Verb::Send => "send <destination_ip> <message> [ttl]",
            Verb::Tick => "tick [count] (alias: process)",
            Verb::ListDevices => "list_devices",
            Verb::Show => concat!(
                "show <history [device]|queue [device]|interfaces [device]|policies [device]",
                "|statistics|error-log [n]|running-config>"
            ),
            Verb::Connect => "connect <interface> <device> <remote_interface>",
            Verb::Disconnect => "disconnect <interface> <device> <remote_interface>",
            Verb::SetDeviceStatus => "set_device_status <device> <online|offline>",
            Verb::Save => "save running-config [filename]",
            Verb::Load => "load config <filename>",
            Verb::Hostname => "hostname <name>",
            Verb::Interface => "interface <name>",
            Verb::Add => "add device <name> <router|switch|host|firewall> | add interface <name>",
            Verb::Remove => "remove device <name>",
            Verb::Policy => {
                "policy set <prefix> <mask> <block|ttl-min N> | policy unset <prefix> <mask>"
            }
            Verb::Ip => "ip address <ip>",
            Verb::Shutdown => "shutdown",
            Verb::No => "no shutdown",
            Verb::Exit => "exit",
            Verb::End => "end",
            Verb::Help => "help",
            Verb::Quit => "quit",
        }
    }
}

/// Comma separated keywords legal in `mode`
fn keywords(mode: &Mode) -> String {
    VERBS
        .iter()
        .filter(|verb| verb.allowed_in(mode))
        .map(|verb| verb.keyword())
        .collect::<Vec<_>>()
        .join(", ")
}

fn help(mode: &Mode) -> String {
    let mut out = format!("Commands available in {} mode:", mode.name());
    for verb in VERBS.iter().filter(|verb| verb.allowed_in(mode)) {
        out.push_str("\n  ");
        out.push_str(verb.usage());
    }
    out
}

fn parse_count(text: &str) -> Result<usize, ValidationError> {
    match text.parse::<usize>() {
        Ok(count) if count > 0 => Ok(count),
        _ => Err(ValidationError::InvalidCount(text.to_string())),
    }
}

fn is(word: &str, expected: &str) -> bool {
    word.eq_ignore_ascii_case(expected)
}

impl Command {
    fn parse(verb: Verb, args: &[String]) -> Result<Command, Error> {
        let usage = || Error::from(ModeError::Usage(verb.usage()));
        let words: Vec<&str> = args.iter().map(String::as_str).collect();
        let command = match (verb, words.as_slice()) {
            (Verb::Enable, []) => Command::Enable,
            (Verb::Disable, []) => Command::Disable,
            (Verb::Configure, [what]) if is(what, "terminal") => Command::ConfigureTerminal,
            (Verb::Console, [device]) => Command::Console(device.to_string()),
            (Verb::Send, [destination, message]) => Command::Send {
                destination: destination.to_string(),
                message: message.to_string(),
                ttl: None,
            },
            (Verb::Send, [destination, message, ttl]) => Command::Send {
                destination: destination.to_string(),
                message: message.to_string(),
                ttl: Some(ttl.to_string()),
            },
            (Verb::Tick, []) => Command::Tick(1),
            (Verb::Tick, [count]) => Command::Tick(parse_count(count)?),
            (Verb::ListDevices, []) => Command::ListDevices,
            (Verb::Show, [target, rest @ ..]) => {
                let device = || rest.first().map(|d| d.to_string());
                let target = match (target.to_ascii_lowercase().as_str(), rest.len()) {
                    ("history", 0 | 1) => ShowTarget::History(device()),
                    ("queue", 0 | 1) => ShowTarget::Queue(device()),
                    ("interfaces", 0 | 1) => ShowTarget::Interfaces(device()),
                    ("statistics", 0) => ShowTarget::Statistics,
                    ("error-log", 0) => ShowTarget::ErrorLog(None),
                    ("error-log", 1) => ShowTarget::ErrorLog(Some(parse_count(rest[0])?)),
                    ("running-config", 0) => ShowTarget::RunningConfig,
                    ("policies", 0 | 1) => ShowTarget::Policies(device()),
                    _ => return Err(usage()),
                };
                Command::Show(target)
            }
            (Verb::Connect | Verb::Disconnect, [local, device, remote]) => {
                let link = LinkArgs {
                    local_interface: local.to_string(),
                    device: device.to_string(),
                    remote_interface: remote.to_string(),
                };
                if verb == Verb::Connect {
                    Command::Connect(link)
                } else {
                    Command::Disconnect(link)
                }
            }
            (Verb::SetDeviceStatus, [device, status]) => Command::SetDeviceStatus {
                device: device.to_string(),
                status: status.parse()?,
            },
            (Verb::Save, [what]) if is(what, "running-config") => Command::SaveConfig(None),
            (Verb::Save, [what, file]) if is(what, "running-config") => {
                Command::SaveConfig(Some(file.to_string()))
            }
            (Verb::Load, [what, file]) if is(what, "config") => {
                Command::LoadConfig(file.to_string())
            }
            (Verb::Hostname, [name]) => Command::Hostname(name.to_string()),
            (Verb::Interface, [name]) => Command::Interface(name.to_string()),
            (Verb::Add, [what, hostname, kind]) if is(what, "device") => Command::AddDevice {
                hostname: hostname.to_string(),
                kind: kind.parse()?,
            },
            (Verb::Add, [what, name]) if is(what, "interface") => {
                Command::AddInterface(name.to_string())
            }
            (Verb::Remove, [what, name]) if is(what, "device") => {
                Command::RemoveDevice(name.to_string())
            }
            (Verb::Policy, [what, prefix, mask, action @ ..]) if is(what, "set") => {
                let prefix = Prefix::parse(prefix, mask)?;
                let action = match action {
                    [word] if is(word, "block") => PolicyAction::Block,
                    [word, min] if is(word, "ttl-min") => {
                        PolicyAction::TtlMin(parse_ttl(min, u8::MAX)?)
                    }
                    _ => return Err(usage()),
                };
                Command::SetPolicy { prefix, action }
            }
            (Verb::Policy, [what, prefix, mask]) if is(what, "unset") => {
                Command::UnsetPolicy(Prefix::parse(prefix, mask)?)
            }
            (Verb::Ip, [what, address]) if is(what, "address") => {
                Command::IpAddress(address.to_string())
            }
            (Verb::Shutdown, []) => Command::Shutdown,
            (Verb::No, [what]) if is(what, "shutdown") => Command::NoShutdown,
            (Verb::Exit, []) => Command::Exit,
            (Verb::End, []) => Command::End,
            (Verb::Help, _) => Command::Help,
            (Verb::Quit, []) => Command::Quit,
            _ => return Err(usage()),
        };
        Ok(command)
    }
}

/// Splits a command line on whitespace, quotes group words into one token
///
/// # Examples
///
/// ```
/// use lansim::cli::tokenize;
/// assert_eq!(tokenize("send 10.0.0.1 hello").unwrap(), ["send", "10.0.0.1", "hello"]);
/// assert_eq!(
///     tokenize("send 10.0.0.1 \"hello there\" 5").unwrap(),
///     ["send", "10.0.0.1", "hello there", "5"]
/// );
/// assert!(tokenize("send 10.0.0.1 'oops").is_err());
/// ```
pub fn tokenize(line: &str) -> Result<Vec<String>, ModeError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;
    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if quote.is_some() {
        return Err(ModeError::UnterminatedQuote);
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

pub struct Session {
    network: Network,
    console: Option<String>,
    mode: Mode,
}

impl Session {
    /// Starts in user mode on the first device, if there is one
    pub fn new(network: Network) -> Self {
        let console = network.devices().first().map(|d| d.hostname().to_string());
        Self {
            network,
            console,
            mode: Mode::User,
        }
    }

    pub fn on(network: Network, console: &str) -> Result<Self, StructuralError> {
        if network.device(console).is_none() {
            return Err(StructuralError::UnknownDevice(console.to_string()));
        }
        Ok(Self {
            network,
            console: Some(console.to_string()),
            mode: Mode::User,
        })
    }

    pub fn network(&self) -> &Network {
        &self.network
    }
    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }
    pub fn console(&self) -> Option<&str> {
        self.console.as_deref()
    }
    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn prompt(&self) -> String {
        match &self.console {
            Some(device) => format!("{device}{} ", self.mode.prompt_suffix()),
            None => "Router-Simulator> ".to_string(),
        }
    }

    /// Runs one command line
    pub fn execute(&mut self, line: &str) -> Result<Reply, Error> {
        let result = self.dispatch(line);
        if let Err(err) = &result {
            if let Some(console) = self.console.clone() {
                self.network.record_error(
                    &console,
                    err.kind(),
                    err.to_string(),
                    Some(line.trim().to_string()),
                );
            }
        }
        result
    }

    fn dispatch(&mut self, line: &str) -> Result<Reply, Error> {
        let tokens = tokenize(line)?;
        let Some((word, args)) = tokens.split_first() else {
            return Ok(Reply::Silent);
        };
        let word = word.to_ascii_lowercase();
        let verb = Verb::lookup(&word)
            .filter(|verb| verb.allowed_in(&self.mode))
            .ok_or_else(|| ModeError::InvalidCommand {
                command: word.clone(),
                mode: self.mode.name(),
                help: keywords(&self.mode),
            })?;
        let command = Command::parse(verb, args)?;
        self.run(command)
    }

    fn console_device(&self) -> Result<String, ModeError> {
        self.console.clone().ok_or(ModeError::NoConsole)
    }

    /// The interface being configured, only set in interface configuration mode
    fn current_interface(&self) -> Result<(String, String), ModeError> {
        match &self.mode {
            Mode::InterfaceConfig { interface } => Ok((self.console_device()?, interface.clone())),
            _ => Err(ModeError::NoConsole),
        }
    }

    fn run(&mut self, command: Command) -> Result<Reply, Error> {
        let reply = match command {
            Command::Enable => {
                self.mode = Mode::Privileged;
                Reply::Silent
            }
            Command::Disable => {
                self.mode = Mode::User;
                Reply::Silent
            }
            Command::ConfigureTerminal => {
                self.console_device()?;
                self.mode = Mode::GlobalConfig;
                Reply::Message("Enter configuration commands, one per line. End with 'end'.".into())
            }
            Command::Console(device) => {
                if self.network.device(&device).is_none() {
                    return Err(StructuralError::UnknownDevice(device).into());
                }
                let reply = Reply::Message(format!("Connected to {device}"));
                self.console = Some(device);
                self.mode = Mode::User;
                reply
            }
            Command::Send {
                destination,
                message,
                ttl,
            } => {
                let source = self.console_device()?;
                let destination = parse_address(&destination)?;
                let ttl = ttl
                    .map(|ttl| parse_ttl(&ttl, self.network.params().max_ttl))
                    .transpose()?;
                let id = self.network.send(&source, destination, message, ttl)?;
                Reply::Message(format!("Message queued for delivery (packet {id})"))
            }
            Command::Tick(count) => {
                if count > self.network.params().max_ticks_per_command {
                    return Err(ValidationError::InvalidCount(count.to_string()).into());
                }
                let mut events = Vec::new();
                for _ in 0..count {
                    events.extend(self.network.tick());
                }
                Reply::Events(events)
            }
            Command::ListDevices => Reply::Report(report::device_list(&self.network)),
            Command::Show(target) => Reply::Report(self.show(target)?),
            Command::Connect(link) => {
                let local = self.console_device()?;
                self.network
                    .connect(&local, &link.local_interface, &link.device, &link.remote_interface)?;
                Reply::Message(format!(
                    "Connected {local}:{} to {}:{}",
                    link.local_interface, link.device, link.remote_interface
                ))
            }
            Command::Disconnect(link) => {
                let local = self.console_device()?;
                self.network.disconnect(
                    &local,
                    &link.local_interface,
                    &link.device,
                    &link.remote_interface,
                )?;
                Reply::Message(format!(
                    "Disconnected {local}:{} from {}:{}",
                    link.local_interface, link.device, link.remote_interface
                ))
            }
            Command::SetDeviceStatus { device, status } => {
                self.network.set_device_status(&device, status)?;
                Reply::Message(format!("Device {device} set to {status}"))
            }
            Command::SaveConfig(file) => {
                let file = file.unwrap_or_else(|| "running-config.json".to_string());
                self.save(&file)?;
                Reply::Message(format!("Configuration saved to {file}"))
            }
            Command::LoadConfig(file) => {
                self.network = self.load(&file)?;
                let kept = self
                    .console
                    .as_deref()
                    .is_some_and(|console| self.network.device(console).is_some());
                if !kept {
                    self.console = self.network.devices().first().map(|d| d.hostname().to_string());
                }
                if self.console.is_none() {
                    self.mode = Mode::User;
                }
                Reply::Message(format!("Configuration loaded from {file}"))
            }
            Command::Hostname(name) => {
                let current = self.console_device()?;
                self.network.rename_device(&current, &name)?;
                let reply = Reply::Message(format!("Hostname changed to {name}"));
                self.console = Some(name);
                reply
            }
            Command::Interface(name) => {
                let device = self.console_device()?;
                if !self.network.interfaces(&device)?.iter().any(|itf| itf.name() == name) {
                    return Err(StructuralError::UnknownInterface {
                        device,
                        interface: name,
                    }
                    .into());
                }
                self.mode = Mode::InterfaceConfig { interface: name };
                Reply::Silent
            }
            Command::AddDevice { hostname, kind } => {
                self.network.add_device(&hostname, kind)?;
                Reply::Message(format!("Device {hostname} ({kind}) added"))
            }
            Command::AddInterface(name) => {
                if !is_valid_interface_name(&name) {
                    return Err(ValidationError::InvalidInterfaceName(name).into());
                }
                let device = self.console_device()?;
                self.network.add_interface(&device, &name)?;
                Reply::Message(format!("Interface {name} added to {device}"))
            }
            Command::RemoveDevice(name) => {
                if self.console.as_deref() == Some(name.as_str()) {
                    return Err(ModeError::ConsoleInUse(name).into());
                }
                self.network.remove_device(&name)?;
                Reply::Message(format!("Device {name} removed"))
            }
            Command::SetPolicy { prefix, action } => {
                let device = self.console_device()?;
                self.network.set_policy(&device, prefix, action)?;
                Reply::Message(match action {
                    PolicyAction::Block => format!("Block policy set for {prefix}"),
                    PolicyAction::TtlMin(min) => format!("TTL minimum {min} set for {prefix}"),
                })
            }
            Command::UnsetPolicy(prefix) => {
                let device = self.console_device()?;
                self.network.unset_policy(&device, prefix)?;
                Reply::Message(format!("Policies removed for {prefix}"))
            }
            Command::IpAddress(address) => {
                let (device, interface) = self.current_interface()?;
                let address = self.network.set_interface_address(&device, &interface, &address)?;
                Reply::Message(format!("IP address {address} configured on {interface}"))
            }
            Command::Shutdown => {
                let (device, interface) = self.current_interface()?;
                self.network
                    .set_interface_admin_state(&device, &interface, AdminState::Down)?;
                Reply::Message(format!("Interface {interface} shutdown"))
            }
            Command::NoShutdown => {
                let (device, interface) = self.current_interface()?;
                self.network
                    .set_interface_admin_state(&device, &interface, AdminState::Up)?;
                Reply::Message(format!("Interface {interface} is up"))
            }
            Command::Exit => match self.mode {
                Mode::InterfaceConfig { .. } => {
                    self.mode = Mode::GlobalConfig;
                    Reply::Silent
                }
                Mode::GlobalConfig => {
                    self.mode = Mode::Privileged;
                    Reply::Silent
                }
                Mode::Privileged => {
                    self.mode = Mode::User;
                    Reply::Silent
                }
                Mode::User => Reply::Quit,
            },
            Command::End => {
                self.mode = Mode::Privileged;
                Reply::Silent
            }
            Command::Help => Reply::Report(help(&self.mode)),
            Command::Quit => Reply::Quit,
        };
        Ok(reply)
    }

    fn show(&self, target: ShowTarget) -> Result<String, Error> {
        let or_console = |device: Option<String>| match device {
            Some(device) => Ok(device),
            None => self.console_device(),
        };
        let text = match target {
            ShowTarget::History(device) => report::history(&self.network, &or_console(device)?)?,
            ShowTarget::Queue(device) => report::queues(&self.network, &or_console(device)?)?,
            ShowTarget::Interfaces(device) => {
                report::interfaces(&self.network, &or_console(device)?)?
            }
            ShowTarget::Statistics => report::statistics(&self.network),
            ShowTarget::ErrorLog(limit) => {
                report::error_log(&self.network, &self.console_device()?, limit)?
            }
            ShowTarget::RunningConfig => {
                report::running_config(&self.network, &self.console_device()?)?
            }
            ShowTarget::Policies(device) => report::policies(&self.network, &or_console(device)?)?,
        };
        Ok(text)
    }

    #[cfg(feature = "serde")]
    fn save(&self, file: &str) -> Result<(), Error> {
        Ok(crate::persist::save_file(&self.network, file)?)
    }

    #[cfg(feature = "serde")]
    fn load(&self, file: &str) -> Result<Network, Error> {
        Ok(crate::persist::load_file(file)?)
    }

    #[cfg(not(feature = "serde"))]
    fn save(&self, _file: &str) -> Result<(), Error> {
        Err(crate::feedback::ConfigError::Unsupported.into())
    }

    #[cfg(not(feature = "serde"))]
    fn load(&self, _file: &str) -> Result<Network, Error> {
        Err(crate::feedback::ConfigError::Unsupported.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizer_groups_quoted_words() {
        assert_eq!(
            tokenize("  send 10.0.0.1 'hi there'  ").unwrap(),
            ["send", "10.0.0.1", "hi there"]
        );
        assert_eq!(tokenize("send x \"\"").unwrap(), ["send", "x", ""]);
        assert_eq!(tokenize("say it\"s\"").unwrap(), ["say", "its"]);
        assert!(tokenize("   ").unwrap().is_empty());
        assert_eq!(tokenize("send \"oops"), Err(ModeError::UnterminatedQuote));
    }

    #[test]
    fn every_mode_can_leave() {
        for mode in [
            Mode::User,
            Mode::Privileged,
            Mode::GlobalConfig,
            Mode::InterfaceConfig {
                interface: "g0/0".into(),
            },
        ] {
            assert!(Verb::Exit.allowed_in(&mode));
            assert!(Verb::Quit.allowed_in(&mode));
            assert!(keywords(&mode).contains("exit"));
        }
    }

    #[test]
    fn arguments_are_checked_per_command() {
        let args = |line: &str| tokenize(line).unwrap();
        assert_eq!(
            Command::parse(Verb::Tick, &args("3")),
            Ok(Command::Tick(3))
        );
        assert_eq!(
            Command::parse(Verb::Tick, &args("0")),
            Err(ValidationError::InvalidCount("0".into()).into())
        );
        assert_eq!(
            Command::parse(Verb::Configure, &args("memory")),
            Err(ModeError::Usage(Verb::Configure.usage()).into())
        );
        assert_eq!(
            Command::parse(Verb::Show, &args("error-log 5")),
            Ok(Command::Show(ShowTarget::ErrorLog(Some(5))))
        );
        assert!(matches!(
            Command::parse(Verb::Add, &args("device Core1 mainframe")),
            Err(Error::Validation(ValidationError::InvalidDeviceKind(_)))
        ));
    }

    #[test]
    fn policy_arguments() {
        let args = |line: &str| tokenize(line).unwrap();
        let prefix = Prefix::parse("10.0.2.0", "255.255.255.0").unwrap();
        assert_eq!(
            Command::parse(Verb::Policy, &args("set 10.0.2.0 255.255.255.0 block")),
            Ok(Command::SetPolicy {
                prefix,
                action: PolicyAction::Block
            })
        );
        assert_eq!(
            Command::parse(Verb::Policy, &args("SET 10.0.2.9 255.255.255.0 ttl-min 4")),
            Ok(Command::SetPolicy {
                prefix,
                action: PolicyAction::TtlMin(4)
            })
        );
        assert_eq!(
            Command::parse(Verb::Policy, &args("unset 10.0.2.0 255.255.255.0")),
            Ok(Command::UnsetPolicy(prefix))
        );
        assert_eq!(
            Command::parse(Verb::Policy, &args("set 10.0.2.0 255.255.255.0 ttl-min")),
            Err(ModeError::Usage(Verb::Policy.usage()).into())
        );
        assert!(Verb::Policy.allowed_in(&Mode::GlobalConfig));
        assert!(!Verb::Policy.allowed_in(&Mode::Privileged));
    }
}
