use std::sync::{Arc, Mutex};

use postgres::NoTls;
use r2d2::Pool;
use r2d2_postgres::PostgresConnectionManager;
use riveer_config::{Field, FieldKind, Schema};
use riveer_node::{BaseNode, GraphNode, NodeError, NodeKind, Payload, PeriodicTaskSpec, SpringNode};
use riveer_registry::RegistryError;
use serde_json::{Map, Value};
use tracing::info;

/// Runs an arbitrary, per-task SQL query against a pooled PostgreSQL
/// connection on a cron schedule and sends the resulting rows
/// downstream as a sequence of JSON records.
///
/// Grounded on `original_source/.../extensions/springs/postgresql.py`.
/// The original uses `psycopg2`'s `ThreadedConnectionPool` and
/// `RealDictCursor`, a blocking, dynamically typed pool-plus-driver
/// pair; this uses `r2d2` (the pool shape the pack's own
/// `chem-persistence` crate uses for Postgres) over the raw `postgres`
/// driver rather than `diesel`, because these queries aren't known at
/// compile time and diesel requires a static schema to generate
/// row-mapping code for.
pub struct PostgresSpring {
  name: String,
  connection: ConnectionConfig,
  tasks: Vec<TaskDef>,
  pool: Mutex<Option<Pool<PostgresConnectionManager<NoTls>>>>,
}

#[derive(Debug, Clone)]
struct ConnectionConfig {
  dbname: String,
  user: String,
  password: Option<String>,
  host: Option<String>,
  port: Option<u16>,
  minconn: u32,
  maxconn: u32,
}

#[derive(Debug, Clone)]
struct TaskDef {
  name: String,
  cron: String,
  query: String,
  outputs: Vec<String>,
  timeout: i64,
}

fn config_schema() -> Schema {
  Schema::new(vec![
    Field::new(
      "connection",
      FieldKind::Object(Schema::new(vec![
        Field::new("dbname", FieldKind::String).env(),
        Field::new("user", FieldKind::String).env(),
        Field::new("password", FieldKind::String).env().optional(Value::Null),
        Field::new("host", FieldKind::String).env().optional(Value::Null),
        Field::new("port", FieldKind::Integer).optional(Value::Null),
        Field::new("minconn", FieldKind::Integer).optional(Value::from(1)),
        Field::new("maxconn", FieldKind::Integer).optional(Value::from(64)),
      ])),
    ),
    Field::new(
      "tasks",
      FieldKind::List(Box::new(FieldKind::Object(Schema::new(vec![
        Field::new("name", FieldKind::String),
        Field::new("cron", FieldKind::String),
        Field::new("query", FieldKind::String),
        Field::new("outputs", FieldKind::List(Box::new(FieldKind::String))).min_len(1),
        Field::new("timeout", FieldKind::Integer).optional(Value::from(60)),
        Field::new(
          "fields",
          FieldKind::List(Box::new(FieldKind::String)),
        )
        .optional(Value::Null),
      ])))),
    ),
  ])
}

impl PostgresSpring {
  pub fn from_configuration(config: &Value) -> Result<Self, RegistryError> {
    let validated = config_schema()
      .validate(config, "postgresql")
      .map_err(|e| RegistryError::Construction {
        type_id: "postgresql".to_string(),
        message: e.to_string(),
      })?;

    let name = config
      .get("configuration")
      .and_then(|c| c.get("name"))
      .and_then(|n| n.as_str())
      .unwrap_or("postgresql")
      .to_string();

    let conn = &validated["connection"];
    let connection = ConnectionConfig {
      dbname: conn["dbname"].as_str().unwrap_or_default().to_string(),
      user: conn["user"].as_str().unwrap_or_default().to_string(),
      password: conn["password"].as_str().map(str::to_string),
      host: conn["host"].as_str().map(str::to_string),
      port: conn["port"].as_i64().map(|p| p as u16),
      minconn: conn["minconn"].as_u64().unwrap_or(1) as u32,
      maxconn: conn["maxconn"].as_u64().unwrap_or(64) as u32,
    };

    let tasks = validated["tasks"]
      .as_array()
      .cloned()
      .unwrap_or_default()
      .into_iter()
      .map(|t| TaskDef {
        name: t["name"].as_str().unwrap_or_default().to_string(),
        cron: t["cron"].as_str().unwrap_or_default().to_string(),
        query: t["query"].as_str().unwrap_or_default().to_string(),
        outputs: t["outputs"]
          .as_array()
          .cloned()
          .unwrap_or_default()
          .into_iter()
          .filter_map(|v| v.as_str().map(str::to_string))
          .collect(),
        timeout: t["timeout"].as_i64().unwrap_or(60),
      })
      .collect();

    Ok(PostgresSpring {
      name,
      connection,
      tasks,
      pool: Mutex::new(None),
    })
  }

  pub fn build_node(config: &Value) -> Result<GraphNode, RegistryError> {
    Ok(GraphNode::Spring(Arc::new(Self::from_configuration(
      config,
    )?)))
  }
}

impl BaseNode for PostgresSpring {
  fn name(&self) -> &str {
    &self.name
  }

  fn kind(&self) -> NodeKind {
    NodeKind::Spring
  }

  fn connect(&self) -> Result<(), NodeError> {
    info!(node = %self.name, "connecting to PostgreSQL database");

    let mut config = postgres::Config::new();
    config.dbname(&self.connection.dbname);
    config.user(&self.connection.user);
    if let Some(password) = &self.connection.password {
      config.password(password);
    }
    if let Some(host) = &self.connection.host {
      config.host(host);
    }
    if let Some(port) = self.connection.port {
      config.port(port);
    }

    let manager = PostgresConnectionManager::new(config, NoTls);
    let pool = Pool::builder()
      .min_idle(Some(self.connection.minconn))
      .max_size(self.connection.maxconn)
      .build(manager)
      .map_err(|e| NodeError::Connect {
        name: self.name.clone(),
        message: e.to_string(),
      })?;

    *self.pool.lock().expect("pool lock poisoned") = Some(pool);
    Ok(())
  }

  fn function(&self, _data: Payload, args: &[Value]) -> Result<Option<Payload>, NodeError> {
    let query = args
      .first()
      .and_then(|v| v.as_str())
      .ok_or_else(|| NodeError::Function {
        name: self.name.clone(),
        message: "missing query argument".to_string(),
      })?;
    let timeout_seconds = args.get(1).and_then(|v| v.as_i64()).unwrap_or(60);

    let pool = self.pool.lock().expect("pool lock poisoned");
    let pool = pool.as_ref().ok_or_else(|| NodeError::Function {
      name: self.name.clone(),
      message: "not connected".to_string(),
    })?;

    let mut conn = pool.get().map_err(|e| NodeError::Function {
      name: self.name.clone(),
      message: e.to_string(),
    })?;

    conn
      .execute(
        &format!("SET statement_timeout = {}", timeout_seconds * 1000),
        &[],
      )
      .map_err(|e| NodeError::Function {
        name: self.name.clone(),
        message: e.to_string(),
      })?;

    let rows = conn.query(query, &[]).map_err(|e| NodeError::Function {
      name: self.name.clone(),
      message: e.to_string(),
    })?;

    let records: Vec<Map<String, Value>> = rows.iter().map(row_to_record).collect();
    Ok(Some(Payload::Sequence(records)))
  }

  fn shutdown(&self) -> Result<(), NodeError> {
    *self.pool.lock().expect("pool lock poisoned") = None;
    info!(node = %self.name, "closed all PostgreSQL connections");
    Ok(())
  }
}

impl SpringNode for PostgresSpring {
  fn periodic_tasks(&self) -> Vec<PeriodicTaskSpec> {
    self
      .tasks
      .iter()
      .map(|t| PeriodicTaskSpec {
        name: t.name.clone(),
        cron: t.cron.clone(),
        args: vec![Value::String(t.query.clone()), Value::from(t.timeout)],
        outputs: t.outputs.clone(),
      })
      .collect()
  }
}

/// Converts a dynamically-shaped Postgres row into a JSON object,
/// matching `json.loads(json.dumps(rows, default=str))`'s effect of
/// coercing anything it can't represent natively down to a string.
fn row_to_record(row: &postgres::Row) -> Map<String, Value> {
  let mut record = Map::new();
  for (i, column) in row.columns().iter().enumerate() {
    let value = match column.type_().name() {
      "int2" | "int4" => row
        .try_get::<_, Option<i32>>(i)
        .ok()
        .flatten()
        .map(|v| Value::from(v))
        .unwrap_or(Value::Null),
      "int8" => row
        .try_get::<_, Option<i64>>(i)
        .ok()
        .flatten()
        .map(Value::from)
        .unwrap_or(Value::Null),
      "float4" | "float8" => row
        .try_get::<_, Option<f64>>(i)
        .ok()
        .flatten()
        .map(Value::from)
        .unwrap_or(Value::Null),
      "bool" => row
        .try_get::<_, Option<bool>>(i)
        .ok()
        .flatten()
        .map(Value::from)
        .unwrap_or(Value::Null),
      _ => row
        .try_get::<_, Option<String>>(i)
        .ok()
        .flatten()
        .map(Value::String)
        .unwrap_or(Value::Null),
    };
    record.insert(column.name().to_string(), value);
  }
  record
}
