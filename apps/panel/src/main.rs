use std::{collections::BTreeSet, sync::Arc};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    pad::PadIndicator,
    switch::SwitchBoard,
    tank::{TankControl, Track, NO_CONFIGURATION_MESSAGE},
    ActionSender, ActionizerClient, MotionCommands, PadController,
};
use futures::future::join_all;
use shared::{
    domain::{DeviceId, SensorId, SewCarInfo},
    protocol::{SwitchValue, WireProtocol},
};
use storage::{SensorInfoRepository, SewCarInfoRepository, Storage};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod drive;

use config::{load_settings, normalize_database_url, Settings};
use drive::{parse_line, DriveInput};

#[derive(Parser, Debug)]
#[command(about = "Operate actionizer switches and the car")]
struct Cli {
    #[arg(long)]
    actionizer_url: Option<String>,
    #[arg(long)]
    database_url: Option<String>,
    #[arg(long)]
    wire_protocol: Option<WireProtocol>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mount every switch (forcing it OFF) and print its state.
    Switches,
    /// Mount one switch, then click it once.
    Toggle { sensor_id: String },
    /// Set every switch of a device, or of all devices, in one request each.
    Sync {
        #[arg(long)]
        payload: u8,
        #[arg(long)]
        device: Option<String>,
    },
    /// Drive the car pad from stdin.
    Drive,
    /// Set both tank sliders.
    Tank {
        #[arg(allow_hyphen_values = true)]
        left: i32,
        #[arg(allow_hyphen_values = true)]
        right: i32,
    },
}

impl Cli {
    fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(v) = &self.actionizer_url {
            settings.actionizer_url = v.clone();
        }
        if let Some(v) = &self.database_url {
            settings.database_url = v.clone();
        }
        if let Some(v) = self.wire_protocol {
            settings.wire_protocol = v;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings();
    cli.apply_overrides(&mut settings);

    let database_url = normalize_database_url(&settings.database_url);
    let storage = Storage::new(&database_url)
        .await
        .with_context(|| format!("failed to open storage at '{database_url}'"))?;
    let client = ActionizerClient::new(&settings.actionizer_url)?.with_protocol(settings.wire_protocol);
    info!(
        endpoint = %client.endpoint(),
        protocol = %client.protocol(),
        "actionizer client ready"
    );
    let sender: Arc<dyn ActionSender> = Arc::new(client);

    match cli.command {
        Command::Switches => {
            let board = load_board(&storage, sender).await?;
            board.mount_all().await;
            print_board(&board).await;
        }
        Command::Toggle { sensor_id } => {
            let board = load_board(&storage, sender).await?;
            let sensor_id = SensorId::from(sensor_id);
            let control = board
                .control(&sensor_id)
                .ok_or_else(|| anyhow!("no switch sensor '{sensor_id}'"))?;
            control.mount().await;
            if control.click().await.is_none() {
                warn!(sensor_id = %sensor_id, "click ignored while loading");
            }
            print_board(&board).await;
        }
        Command::Sync { payload, device } => {
            let value = SwitchValue::try_from(payload)?;
            let board = load_board(&storage, sender).await?;
            let devices: BTreeSet<DeviceId> = match device {
                Some(device) => BTreeSet::from([DeviceId::from(device)]),
                None => board
                    .controls()
                    .iter()
                    .map(|control| control.sensor().device_id.clone())
                    .collect(),
            };
            for device_id in &devices {
                board.sync_device(device_id, value).await;
            }
            print_board(&board).await;
        }
        Command::Drive => {
            let Some(car) = load_car(&storage).await? else {
                println!("{NO_CONFIGURATION_MESSAGE}");
                return Ok(());
            };
            drive(car, sender, settings.default_power).await?;
        }
        Command::Tank { left, right } => {
            let Some(car) = load_car(&storage).await? else {
                println!("{NO_CONFIGURATION_MESSAGE}");
                return Ok(());
            };
            let mut tank = TankControl::new(car, sender);
            let sends = [tank.slide(Track::Left, left), tank.slide(Track::Right, right)];
            for send in sends {
                send.await.context("tank command queue stopped")?;
            }
            let (left, right) = tank.powers();
            println!("left={left} right={right}");
        }
    }

    Ok(())
}

async fn load_board(storage: &Storage, sender: Arc<dyn ActionSender>) -> Result<SwitchBoard> {
    let sensors = SensorInfoRepository::new(storage.clone()).load().await?;
    Ok(SwitchBoard::new(&sensors, sender))
}

async fn load_car(storage: &Storage) -> Result<Option<SewCarInfo>> {
    SewCarInfoRepository::new(storage.clone()).load().await
}

async fn print_board(board: &SwitchBoard) {
    for line in board.render().await {
        println!("{line}");
    }
}

async fn drive(car: SewCarInfo, sender: Arc<dyn ActionSender>, power: u32) -> Result<()> {
    let mut pad = PadController::new(MotionCommands::new(car, sender));
    pad.set_power(power);

    let mut sends = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = match parse_line(&line) {
            Ok(Some(input)) => input,
            Ok(None) => continue,
            Err(err) => {
                warn!(line = %line, error = %err, "skipping pad line");
                continue;
            }
        };

        match input {
            DriveInput::Power(power) => pad.set_power(power),
            DriveInput::Pad(event) => {
                if let Some(send) = pad.handle(event) {
                    sends.push(send);
                }
            }
        }

        let state = pad.state();
        match state.indicator {
            PadIndicator::Neutral => println!("neutral power={}", state.power),
            PadIndicator::Pressed(direction) => println!("{direction} power={}", state.power),
        }
    }

    for result in join_all(sends).await {
        if let Err(err) = result {
            bail!("pad command queue stopped: {err}");
        }
    }
    Ok(())
}
