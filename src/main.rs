// Rental Catalog - admin console over the configured storage backend

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};

use rental_catalog::{logging, Entity, Kind, Storage, StorageConfig};

#[derive(Parser)]
#[command(name = "rental-catalog")]
#[command(about = "Inspect and edit the rental catalog store")]
struct Cli {
    #[command(flatten)]
    storage: StorageConfig,

    #[arg(long, short, global = true, help = "Enable verbose output")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print every object, or every object of one kind
    All { kind: Option<String> },

    /// Count objects, optionally of one kind
    Count { kind: Option<String> },

    /// Print one object
    Show { kind: String, id: String },

    /// Create an object from field=value pairs
    Create { kind: String, fields: Vec<String> },

    /// Change one field of an object
    Update {
        kind: String,
        id: String,
        field: String,
        value: String,
    },

    /// Delete an object
    Destroy { kind: String, id: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose);

    let mut storage = cli.storage.open().context("Failed to open storage")?;
    run(storage.as_mut(), cli.command)
}

fn run(storage: &mut dyn Storage, command: Command) -> Result<()> {
    match command {
        Command::All { kind } => {
            let objects = match kind {
                Some(name) => storage.all(Some(parse_kind(&name)?))?,
                None => storage.all(None)?,
            };
            let dicts: Vec<Value> = objects.into_values().map(|e| Value::Object(e.to_dict())).collect();
            print_json(&Value::Array(dicts))?;
        }
        Command::Count { kind } => {
            let count = match kind {
                Some(name) => storage.count(Some(parse_kind(&name)?))?,
                None => storage.count(None)?,
            };
            println!("{}", count);
        }
        Command::Show { kind, id } => {
            let entity = find(storage, &kind, &id)?;
            print_json(&Value::Object(entity.to_dict()))?;
        }
        Command::Create { kind, fields } => {
            let kind = parse_kind(&kind)?;
            let mut data = Map::new();
            for field in &fields {
                let (name, value) = parse_assignment(field)?;
                data.insert(name, value);
            }

            let mut entity = Entity::from_request(kind, &data)?;
            entity.save(storage)?;
            println!("{}", entity.id());
        }
        Command::Update { kind, id, field, value } => {
            let mut entity = find(storage, &kind, &id)?;
            entity
                .apply_update(&field, &parse_value(&value))
                .with_context(|| format!("Cannot update {}", entity.key()))?;
            entity.save(storage)?;
            print_json(&Value::Object(entity.to_dict()))?;
        }
        Command::Destroy { kind, id } => {
            let entity = find(storage, &kind, &id)?;
            storage.delete(&entity)?;
            println!("✓ Deleted {}", entity.key());
        }
    }

    Ok(())
}

fn parse_kind(name: &str) -> Result<Kind> {
    name.parse::<Kind>()
        .with_context(|| format!("Valid kinds: {}", Kind::ALL.map(|k| k.as_str()).join(", ")))
}

fn find(storage: &dyn Storage, kind: &str, id: &str) -> Result<Entity> {
    let kind = parse_kind(kind)?;
    match storage.get(Some(kind), Some(id))? {
        Some(entity) => Ok(entity),
        None => bail!("No {} with id {}", kind, id),
    }
}

/// JSON literal when it parses as one, plain string otherwise
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn parse_assignment(field: &str) -> Result<(String, Value)> {
    let Some((name, value)) = field.split_once('=') else {
        bail!("Expected field=value, got `{}`", field);
    };
    Ok((name.to_string(), parse_value(value)))
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rental_catalog::FileStorage;
    use serde_json::json;

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("3"), json!(3));
        assert_eq!(parse_value("4.5"), json!(4.5));
        assert_eq!(parse_value("\"My house\""), json!("My house"));
        assert_eq!(parse_value("Nevada"), json!("Nevada"));
        assert_eq!(parse_value("[\"a\"]"), json!(["a"]));
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(parse_assignment("name=Nevada").unwrap(), ("name".to_string(), json!("Nevada")));
        assert_eq!(parse_assignment("url=a=b").unwrap(), ("url".to_string(), json!("a=b")));
        assert!(parse_assignment("name").is_err());
    }

    #[test]
    fn test_console_commands() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::open(dir.path().join("file.json"));

        run(
            &mut storage,
            Command::Create {
                kind: "State".to_string(),
                fields: vec!["name=Nevada".to_string()],
            },
        )
        .unwrap();
        assert_eq!(storage.count(Some(Kind::State)).unwrap(), 1);

        let id = storage.all(Some(Kind::State)).unwrap().into_values().next().unwrap().id().to_string();
        run(
            &mut storage,
            Command::Update {
                kind: "State".to_string(),
                id: id.clone(),
                field: "name".to_string(),
                value: "Utah".to_string(),
            },
        )
        .unwrap();
        let state = storage.get(Some(Kind::State), Some(&id)).unwrap().unwrap();
        assert_eq!(state.attribute("name"), Some(json!("Utah")));

        assert!(run(
            &mut storage,
            Command::Show {
                kind: "Castle".to_string(),
                id: id.clone(),
            },
        )
        .is_err());

        run(
            &mut storage,
            Command::Destroy {
                kind: "State".to_string(),
                id,
            },
        )
        .unwrap();
        assert_eq!(storage.count(None).unwrap(), 0);
    }
}
