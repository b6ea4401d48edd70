//! duckbridge command line
//!
//! `demo` pushes a mixed-type table through the appender and reads it back
//! through the result cursor; `layout` prints how a type is laid out in a
//! vector.

use anyhow::{bail, Context};
use chrono::{NaiveDate, TimeDelta};
use clap::{Parser, Subcommand};
use duckbridge::common::constants::{STRING_HEADER_SIZE, STRING_INLINE_LENGTH};
use duckbridge::native::local::{CollectingSink, MemoryResult};
use duckbridge::native::EngineInfo;
use duckbridge::{
    Appender, DriverConfig, LogicalType, PhysicalType, QueryResult, TypeCache, Value,
};
use num_bigint::BigInt;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "duckbridge")]
#[command(about = "Vector marshaling between host values and engine data chunks")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Append a sample table and read it back
    Demo {
        /// Number of rows to append
        #[arg(short, long, default_value_t = 10)]
        rows: usize,

        /// Print rows as JSON lines instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show the vector layout of a type, e.g. `INTEGER`, `DECIMAL(18,3)` or `VARCHAR[]`
    Layout {
        #[arg(value_name = "TYPE")]
        type_name: String,
    },
}

fn init_tracing(config: &DriverConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn demo_columns() -> anyhow::Result<Vec<(String, LogicalType)>> {
    Ok(vec![
        ("id".to_string(), LogicalType::BigInt),
        ("amount".to_string(), LogicalType::decimal(18, 2)?),
        ("name".to_string(), LogicalType::Varchar),
        ("seen_at".to_string(), LogicalType::TimestampMs),
        ("tags".to_string(), LogicalType::list(LogicalType::Varchar)),
        (
            "point".to_string(),
            LogicalType::struct_of(vec![("x", LogicalType::Double), ("y", LogicalType::Double)]),
        ),
        (
            "attrs".to_string(),
            LogicalType::map(LogicalType::Varchar, LogicalType::Integer),
        ),
        (
            "mood".to_string(),
            LogicalType::enumeration(["sad", "ok", "happy"]),
        ),
        ("big".to_string(), LogicalType::VarInt),
        ("key".to_string(), LogicalType::Uuid),
    ])
}

fn demo_row(i: usize) -> anyhow::Result<Vec<Value>> {
    let n = i as i64;
    let start = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .context("invalid demo start date")?;
    let name = if i % 2 == 0 {
        format!("row {}", i)
    } else {
        format!("a longer name for row {}", i)
    };
    let tags = (0..i % 3).map(|t| Value::from(format!("t{}", t))).collect();
    let attrs = if i % 4 == 3 {
        Value::Null
    } else {
        Value::map(vec![(Value::from("n"), Value::Integer(i as i32))])
    };
    Ok(vec![
        Value::BigInt(n),
        Value::Decimal(Decimal::new(n * 1_234 + 5, 2)),
        Value::from(name),
        Value::Timestamp(start + TimeDelta::milliseconds(n * 90_061_001)),
        Value::list(tags),
        Value::struct_(vec![
            ("x", Value::Double(n as f64 / 2.0)),
            ("y", Value::Double(-(n as f64))),
        ]),
        attrs,
        Value::Enum(["sad", "ok", "happy"][i % 3].to_string()),
        Value::VarInt(BigInt::from(u64::MAX) * BigInt::from(n - 5)),
        Value::Uuid(Uuid::from_u128(0x1234_5678_9abc_def0_u128 << 64 | i as u128)),
    ])
}

fn run_demo(config: &DriverConfig, rows: usize, json: bool) -> anyhow::Result<()> {
    let columns = demo_columns()?;
    let (names, types): (Vec<String>, Vec<LogicalType>) = columns.into_iter().unzip();

    let mut sink = CollectingSink::new();
    {
        let mut appender = Appender::new(types.clone(), &mut sink, config)?;
        for i in 0..rows {
            appender.append_row(&demo_row(i)?)?;
        }
        appender.close()?;
    }
    tracing::debug!("sink holds {} chunks", sink.chunks().len());

    let source = MemoryResult::new(names.clone(), types.clone(), sink.into_chunks())?;
    let mut result = QueryResult::with_config(source, Arc::new(TypeCache::new()), config);
    let rows = result.collect_rows()?;

    if json {
        for row in &rows {
            let object = names
                .iter()
                .zip(row)
                .map(|(name, value)| -> anyhow::Result<_> {
                    Ok((name.clone(), serde_json::to_value(value)?))
                })
                .collect::<anyhow::Result<serde_json::Map<_, _>>>()?;
            println!("{}", serde_json::Value::Object(object));
        }
    } else {
        print!("{}", table_string(&names, &types, &rows));
        println!(
            "{} row{} in {} chunk{}",
            rows.len(),
            if rows.len() == 1 { "" } else { "s" },
            result.chunks_read(),
            if result.chunks_read() == 1 { "" } else { "s" }
        );
    }
    Ok(())
}

fn border(widths: &[usize], left: char, middle: char, right: char) -> String {
    let mut line = String::new();
    line.push(left);
    for (i, width) in widths.iter().enumerate() {
        line.push_str(&"─".repeat(width + 2));
        if i < widths.len() - 1 {
            line.push(middle);
        }
    }
    line.push(right);
    line.push('\n');
    line
}

fn cells(values: &[String], widths: &[usize]) -> String {
    let mut line = String::from("│");
    for (i, (value, width)) in values.iter().zip(widths).enumerate() {
        line.push_str(&format!(" {:width$} ", value, width = width));
        if i < values.len() - 1 {
            line.push('│');
        }
    }
    line.push_str("│\n");
    line
}

fn table_string(names: &[String], types: &[LogicalType], rows: &[Vec<Value>]) -> String {
    let type_names: Vec<String> = types.iter().map(ToString::to_string).collect();
    let rendered: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect();
    let mut widths: Vec<usize> = names
        .iter()
        .zip(&type_names)
        .map(|(name, type_name)| name.chars().count().max(type_name.chars().count()))
        .collect();
    for row in &rendered {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut output = border(&widths, '┌', '┬', '┐');
    output.push_str(&cells(names, &widths));
    output.push_str(&cells(&type_names, &widths));
    output.push_str(&border(&widths, '├', '┼', '┤'));
    for row in &rendered {
        output.push_str(&cells(row, &widths));
    }
    output.push_str(&border(&widths, '└', '┴', '┘'));
    output
}

fn parse_type(name: &str) -> anyhow::Result<LogicalType> {
    let name = name.trim();
    if let Some(inner) = name.strip_suffix("[]") {
        return Ok(LogicalType::list(parse_type(inner)?));
    }
    if let Some((inner, size)) = name
        .strip_suffix(']')
        .and_then(|rest| rest.rsplit_once('['))
    {
        let size = size.trim().parse().context("array size must be a number")?;
        return Ok(LogicalType::array(parse_type(inner)?, size));
    }
    let upper = name.to_ascii_uppercase();
    if let Some(args) = upper
        .strip_prefix("DECIMAL(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let (width, scale) = args.split_once(',').context("DECIMAL needs (width,scale)")?;
        return Ok(LogicalType::decimal(
            width.trim().parse()?,
            scale.trim().parse()?,
        )?);
    }
    Ok(match upper.as_str() {
        "BOOLEAN" | "BOOL" => LogicalType::Boolean,
        "TINYINT" => LogicalType::TinyInt,
        "SMALLINT" => LogicalType::SmallInt,
        "INTEGER" | "INT" => LogicalType::Integer,
        "BIGINT" => LogicalType::BigInt,
        "HUGEINT" => LogicalType::HugeInt,
        "UTINYINT" => LogicalType::UTinyInt,
        "USMALLINT" => LogicalType::USmallInt,
        "UINTEGER" => LogicalType::UInteger,
        "UBIGINT" => LogicalType::UBigInt,
        "UHUGEINT" => LogicalType::UHugeInt,
        "FLOAT" | "REAL" => LogicalType::Float,
        "DOUBLE" => LogicalType::Double,
        "DATE" => LogicalType::Date,
        "TIME" => LogicalType::Time,
        "TIMETZ" => LogicalType::TimeTz,
        "TIMESTAMP" => LogicalType::Timestamp,
        "TIMESTAMP_S" => LogicalType::TimestampS,
        "TIMESTAMP_MS" => LogicalType::TimestampMs,
        "TIMESTAMP_NS" => LogicalType::TimestampNs,
        "TIMESTAMPTZ" => LogicalType::TimestampTz,
        "INTERVAL" => LogicalType::Interval,
        "VARCHAR" | "TEXT" => LogicalType::Varchar,
        "BLOB" => LogicalType::Blob,
        "UUID" => LogicalType::Uuid,
        "VARINT" => LogicalType::VarInt,
        other => bail!("unknown type '{}'", other),
    })
}

fn run_layout(type_name: &str) -> anyhow::Result<()> {
    let logical_type = parse_type(type_name)?;
    let physical = logical_type.physical_type();
    println!("type:          {}", logical_type);
    println!("physical:      {}", physical);
    println!("row stride:    {} bytes", physical.get_size());
    println!("alignment:     {} bytes", physical.get_alignment());
    println!("chunk rows:    {}", EngineInfo::vector_size());
    match (&logical_type, physical) {
        (_, PhysicalType::VarcharString) => println!(
            "string header: {} bytes, payloads up to {} bytes inline",
            STRING_HEADER_SIZE, STRING_INLINE_LENGTH
        ),
        (LogicalType::List(child), _) => {
            println!("entries:       (u64 offset, u64 length) into a {} child", child)
        }
        (LogicalType::Array { child, size }, _) => {
            println!("child rows:    {} {} per row at row * {}", size, child, size)
        }
        (LogicalType::Decimal { scale, .. }, backing) => {
            println!("backing:       {} scaled by 10^{}", backing, scale)
        }
        _ => {}
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = DriverConfig::from_env()?;
    init_tracing(&config);

    match cli.command {
        Command::Demo { rows, json } => run_demo(&config, rows, json),
        Command::Layout { type_name } => run_layout(&type_name),
    }
}
