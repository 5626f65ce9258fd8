use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use client_core::forms::{
    add_sensor, delete_sensor, SensorForm, SensorInfoUpdate, SewCarForm, SewCarInfoUpdate,
};
use shared::domain::{DeviceId, SensorId, SensorType};
use storage::{SensorInfoRepository, SewCarInfoRepository, Storage};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://./data/panel.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(subcommand)]
    Sensors(SensorsCommand),
    #[command(subcommand)]
    Car(CarCommand),
}

#[derive(Subcommand, Debug)]
enum SensorsCommand {
    List,
    Add {
        #[arg(long)]
        device_id: String,
        #[arg(long)]
        sensor_id: String,
        #[arg(long)]
        name: String,
        #[arg(long = "type")]
        sensor_type: Option<SensorType>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Removes the sensor at `index` as printed by `list`.
    Delete { index: usize },
}

#[derive(Subcommand, Debug)]
enum CarCommand {
    Show,
    Set {
        #[arg(long)]
        device_id: String,
        #[arg(long)]
        motor_left: String,
        #[arg(long)]
        motor_right: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::Sensors(command) => {
            let repository = SensorInfoRepository::new(storage);
            let sensors = repository.load().await?;
            match command {
                SensorsCommand::List => {
                    if sensors.is_empty() {
                        println!("no sensors configured");
                    }
                    for (index, sensor) in sensors.iter().enumerate() {
                        println!(
                            "{index}: {} [{}] {} on {} {}",
                            sensor.name,
                            sensor.sensor_id,
                            sensor.sensor_type,
                            sensor.device_id,
                            sensor.color.as_deref().unwrap_or("-")
                        );
                    }
                }
                SensorsCommand::Add {
                    device_id,
                    sensor_id,
                    name,
                    sensor_type,
                    color,
                } => {
                    let mut form = SensorForm::default();
                    form.update(SensorInfoUpdate {
                        device_id: Some(DeviceId::from(device_id)),
                        sensor_id: Some(SensorId::from(sensor_id)),
                        sensor_type,
                        name: Some(name),
                        color,
                    });
                    form.validate()?;
                    let sensor = form.sensor().clone();
                    if !repository.save(&add_sensor(&sensors, sensor.clone())).await? {
                        bail!("sensor list was rejected");
                    }
                    println!("added {} [{}]", sensor.name, sensor.sensor_id);
                }
                SensorsCommand::Delete { index } => {
                    let Some(removed) = sensors.get(index).cloned() else {
                        println!("no sensor at index {index}");
                        return Ok(());
                    };
                    let remaining = delete_sensor(&sensors, index);
                    if remaining.is_empty() {
                        repository.clear().await?;
                    } else if !repository.save(&remaining).await? {
                        bail!("sensor list was rejected");
                    }
                    println!("deleted {} [{}]", removed.name, removed.sensor_id);
                }
            }
        }
        Command::Car(command) => {
            let repository = SewCarInfoRepository::new(storage);
            match command {
                CarCommand::Show => match repository.load().await? {
                    Some(car) => println!(
                        "device={} left={} right={}",
                        car.device_id, car.motor_left, car.motor_right
                    ),
                    None => println!("no car configured"),
                },
                CarCommand::Set {
                    device_id,
                    motor_left,
                    motor_right,
                } => {
                    let mut form = SewCarForm::default();
                    form.update(SewCarInfoUpdate {
                        device_id: Some(DeviceId::from(device_id)),
                        motor_left: Some(SensorId::from(motor_left)),
                        motor_right: Some(SensorId::from(motor_right)),
                    });
                    form.validate()?;
                    let car = form.car().clone();
                    if !repository.save(&car).await? {
                        bail!("car configuration was rejected");
                    }
                    println!("saved car {}", car.device_id);
                }
            }
        }
    }

    Ok(())
}
