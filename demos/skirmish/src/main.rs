//! Skirmish - terminal battle demo
//!
//! One party member against one slime, fought over the in-memory
//! transport: a scripted stub server resolves every outcome, the
//! marionette client replays it as timed playback, and this binary is
//! only the host engine stand-in plus a crossterm renderer.
//!
//! Controls: arrow keys to move, Enter to confirm, Esc to cancel a
//! picker, q to quit.

mod server;
mod sim;

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode},
    execute,
    style::Print,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use marionette_core::{
    BattleIo, CommandChoice, ContentDefs, GateCell, ItemId, PuppetController, SharedState,
    SkillId, SyncConfig,
};
use marionette_net::{BattleClient, InMemoryTransport};
use server::StubServer;
use sim::{Menu, SimHost, SimStage};
use std::io::{stdout, Write};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::debug;

const TICK_INTERVAL_MS: u64 = 50;

/// Entries in the host's command menu
const COMMANDS: [(&str, CommandChoice); 6] = [
    ("Attack", CommandChoice::Attack),
    ("Fire", CommandChoice::Skill(SkillId(8))),
    ("Focus", CommandChoice::Skill(SkillId(9))),
    ("Potion", CommandChoice::Item(ItemId(7))),
    ("Guard", CommandChoice::Guard),
    ("Flee", CommandChoice::Flee),
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let defs = load_content()?;
    let config = load_config();

    let (server_end, client_end) = InMemoryTransport::pair();
    let mut stub = StubServer::new(server_end)?;
    let mut client = BattleClient::new(client_end, PuppetController::new(config, defs));

    let mut host = SimHost::new();
    let mut stage = SimStage::new();
    let mut gate = GateCell::new(SharedState::new());

    terminal::enable_raw_mode()?;
    let mut out = stdout();
    execute!(out, EnterAlternateScreen, Hide)?;

    let result = run(&mut out, &mut stub, &mut client, &mut host, &mut stage, &mut gate);

    execute!(out, Show, LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

fn load_content() -> Result<ContentDefs, Box<dyn std::error::Error>> {
    let paths = ["demos/skirmish/data/content.ron", "data/content.ron"];
    for path in &paths {
        if Path::new(path).exists() {
            let mut loader = marionette_script::Loader::new();
            loader.load_file(path)?;
            return Ok(loader.finish());
        }
    }
    Err("could not find content.ron".into())
}

fn load_config() -> SyncConfig {
    let paths = ["demos/skirmish/data/config.ron", "data/config.ron"];
    for path in &paths {
        if Path::new(path).exists() {
            match marionette_script::load_config(path) {
                Ok(config) => return config,
                Err(e) => debug!(error = %e, "config file unreadable, using defaults"),
            }
        }
    }
    SyncConfig::default()
}

fn run(
    out: &mut std::io::Stdout,
    stub: &mut StubServer,
    client: &mut BattleClient<InMemoryTransport>,
    host: &mut SimHost,
    stage: &mut SimStage,
    gate: &mut GateCell,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut last_tick = Instant::now();

    loop {
        // Input (non-blocking).
        if event::poll(Duration::from_millis(10))? {
            if let Event::Key(key) = event::read()? {
                if key.code == KeyCode::Char('q') {
                    return Ok(());
                }
                handle_key(key.code, client, host, stage, gate);
            }
        }

        // Fixed-interval tick: server, scene clock, client pump.
        let now = Instant::now();
        if now.duration_since(last_tick) >= Duration::from_millis(TICK_INTERVAL_MS) {
            last_tick = now;
            stub.pump()?;
            stage.step();
            let mut io = BattleIo {
                host: &mut *host,
                stage: &mut *stage,
                gate: &mut *gate,
            };
            client.pump(&mut io)?;
        }

        render(out, client.controller(), host, stage)?;

        if stub.finished && !client.controller().puppet_active() {
            render_result(out, host)?;
            wait_for_any_key()?;
            return Ok(());
        }
    }
}

fn handle_key(
    code: KeyCode,
    client: &mut BattleClient<InMemoryTransport>,
    host: &mut SimHost,
    stage: &mut SimStage,
    gate: &mut GateCell,
) {
    let menu = host.menu;
    let enemy_count = client
        .controller()
        .session()
        .map(|s| s.troop.len())
        .unwrap_or(0);
    let ally_count = host.party.len();

    match menu {
        Menu::Hidden => {}
        Menu::Command { actor, cursor } => match code {
            KeyCode::Up => {
                host.menu = Menu::Command {
                    actor,
                    cursor: cursor.checked_sub(1).unwrap_or(COMMANDS.len() - 1),
                };
            }
            KeyCode::Down => {
                host.menu = Menu::Command {
                    actor,
                    cursor: (cursor + 1) % COMMANDS.len(),
                };
            }
            KeyCode::Enter => {
                let choice = COMMANDS[cursor].1;
                let mut io = BattleIo {
                    host: &mut *host,
                    stage: &mut *stage,
                    gate: &mut *gate,
                };
                client.controller_mut().command_chosen(&mut io, choice);
            }
            _ => {}
        },
        Menu::EnemyPicker { cursor } => {
            picker_key(code, cursor, enemy_count, client, host, stage, gate, true)
        }
        Menu::AllyPicker { cursor } => {
            picker_key(code, cursor, ally_count, client, host, stage, gate, false)
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn picker_key(
    code: KeyCode,
    cursor: usize,
    count: usize,
    client: &mut BattleClient<InMemoryTransport>,
    host: &mut SimHost,
    stage: &mut SimStage,
    gate: &mut GateCell,
    enemies: bool,
) {
    let rebuild = |cursor| {
        if enemies {
            Menu::EnemyPicker { cursor }
        } else {
            Menu::AllyPicker { cursor }
        }
    };
    match code {
        KeyCode::Up | KeyCode::Left if count > 0 => {
            host.menu = rebuild(cursor.checked_sub(1).unwrap_or(count - 1));
        }
        KeyCode::Down | KeyCode::Right if count > 0 => {
            host.menu = rebuild((cursor + 1) % count);
        }
        KeyCode::Enter => {
            let mut io = BattleIo {
                host: &mut *host,
                stage: &mut *stage,
                gate: &mut *gate,
            };
            client.controller_mut().target_confirmed(&mut io, cursor);
        }
        KeyCode::Esc => {
            let mut io = BattleIo {
                host: &mut *host,
                stage: &mut *stage,
                gate: &mut *gate,
            };
            client.controller_mut().target_cancelled(&mut io);
        }
        _ => {}
    }
}

fn render(
    out: &mut std::io::Stdout,
    controller: &PuppetController,
    host: &SimHost,
    stage: &SimStage,
) -> Result<(), Box<dyn std::error::Error>> {
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    execute!(out, Print("=== SKIRMISH ===  (q to quit)\r\n\r\n"))?;

    if let Some(session) = controller.session() {
        execute!(out, Print("Enemies:\r\n"))?;
        for member in &session.troop {
            let marker = match host.menu {
                Menu::EnemyPicker { cursor } if cursor == member.index => "> ",
                _ => "  ",
            };
            let status = if member.hidden { " (down)" } else { "" };
            execute!(
                out,
                Print(format!(
                    "{}{}  hp {}/{}{}\r\n",
                    marker, member.name, member.vitals.hp, member.vitals.max_hp, status
                ))
            )?;
        }

        execute!(out, Print("\r\nParty:\r\n"))?;
        for member in &session.party {
            let marker = match host.menu {
                Menu::AllyPicker { cursor } if cursor == member.index => "> ",
                _ => "  ",
            };
            execute!(
                out,
                Print(format!(
                    "{}{}  hp {}/{}  mp {}/{}  tp {}\r\n",
                    marker,
                    member.name,
                    member.vitals.hp,
                    member.vitals.max_hp,
                    member.vitals.mp,
                    member.vitals.max_mp,
                    member.vitals.tp
                ))
            )?;
        }
    } else if stage.in_battle {
        execute!(out, Print("(battle starting...)\r\n"))?;
    } else {
        execute!(out, Print("(no battle in progress)\r\n"))?;
    }

    if let Menu::Command { cursor, .. } = host.menu {
        execute!(out, Print("\r\nCommand:\r\n"))?;
        for (i, (label, _)) in COMMANDS.iter().enumerate() {
            let marker = if i == cursor { "> " } else { "  " };
            execute!(out, Print(format!("{}{}\r\n", marker, label)))?;
        }
    }

    execute!(out, Print("\r\nLog:\r\n"))?;
    for line in stage.log.iter().rev().take(8).rev() {
        execute!(out, Print(format!("  {}\r\n", line)))?;
    }
    out.flush()?;
    Ok(())
}

fn render_result(
    out: &mut std::io::Stdout,
    host: &SimHost,
) -> Result<(), Box<dyn std::error::Error>> {
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    execute!(out, Print("=== BATTLE OVER ===\r\n\r\n"))?;
    if let Some(result) = host.finalized {
        execute!(out, Print(format!("Result: {:?}\r\n", result)))?;
    }
    for (actor, exp) in &host.exp {
        execute!(out, Print(format!("Actor {} gained {} exp\r\n", actor, exp)))?;
    }
    if host.gold != 0 {
        execute!(out, Print(format!("Gold: +{}\r\n", host.gold)))?;
    }
    for (kind, id, quantity) in &host.items {
        execute!(
            out,
            Print(format!("Drop: {:?} {} x{}\r\n", kind, id, quantity))
        )?;
    }
    execute!(out, Print("\r\nPress any key to exit."))?;
    out.flush()?;
    Ok(())
}

fn wait_for_any_key() -> Result<(), Box<dyn std::error::Error>> {
    loop {
        if let Event::Key(_) = event::read()? {
            return Ok(());
        }
    }
}
