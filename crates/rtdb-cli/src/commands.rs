use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use colored::Colorize;
use serde_json::Value;
use tracing::debug;

use rtdb_client::{
    AuthMethod, CallContext, ClientConfig, Conditional, DatabaseClient, ETag, Reference,
};
use rtdb_iid::{InstanceIdClient, InstanceIdConfig};
use rtdb_protocol::HttpTransport;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        command,
        config,
        url,
        token,
        timeout_ms,
        ..
    } = cli;

    let ctx = match timeout_ms {
        Some(ms) => CallContext::background().with_timeout(Duration::from_millis(ms)),
        None => CallContext::background(),
    };
    let auth = match token {
        Some(token) => AuthMethod::Bearer(token),
        None => AuthMethod::Anonymous,
    };
    let connect = move |auth: AuthMethod| -> anyhow::Result<DatabaseClient> {
        let config = load_config(config.as_deref(), url)?;
        debug!(url = %config.database_url, auth = auth.display_name(), "connecting");
        Ok(DatabaseClient::connect(&config, auth)?)
    };

    match command {
        Command::Get(args) => cmd_get(&ctx, &connect(auth)?, args).await,
        Command::Set(args) => cmd_set(&ctx, &connect(auth)?, args).await,
        Command::Update(args) => cmd_update(&ctx, &connect(auth)?, args).await,
        Command::Push(args) => cmd_push(&ctx, &connect(auth)?, args).await,
        Command::Delete(args) => {
            connect(auth)?.reference(&args.path)?.delete(&ctx).await?;
            println!("{} Deleted {}", "✓".green(), args.path.bold());
            Ok(())
        }
        Command::Incr(args) => cmd_incr(&ctx, &connect(auth)?, args).await,
        Command::DeleteIid(args) => cmd_delete_iid(&ctx, timeout_ms, auth, args).await,
    }
}

fn load_config(path: Option<&Path>, url: Option<String>) -> anyhow::Result<ClientConfig> {
    let mut config = match path {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::default(),
    };
    if let Some(url) = url {
        config.database_url = url;
    }
    config.validate()?;
    Ok(config)
}

fn parse_json(text: &str) -> anyhow::Result<Value> {
    serde_json::from_str(text).with_context(|| format!("not valid JSON: {text}"))
}

fn print_value(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn cmd_get(ctx: &CallContext, client: &DatabaseClient, args: GetArgs) -> anyhow::Result<()> {
    let r = client.reference(&args.path)?;
    if let Some(tag) = args.if_changed {
        match r.get_if_changed::<Value>(ctx, &ETag::new(tag)).await? {
            Conditional::Changed { value, etag } => {
                println!("{} {}", "etag:".dimmed(), etag.as_str().yellow());
                print_value(&value)
            }
            Conditional::Unchanged { etag } => {
                println!("Unchanged ({})", etag.as_str().yellow());
                Ok(())
            }
        }
    } else if args.etag {
        let (value, etag): (Value, ETag) = r.get_with_etag(ctx).await?;
        println!("{} {}", "etag:".dimmed(), etag.as_str().yellow());
        print_value(&value)
    } else {
        let value: Value = r.get(ctx).await?;
        print_value(&value)
    }
}

async fn cmd_set(ctx: &CallContext, client: &DatabaseClient, args: SetArgs) -> anyhow::Result<()> {
    let r = client.reference(&args.path)?;
    let value = parse_json(&args.value)?;
    match args.if_match {
        Some(tag) => {
            if r.set_if_unchanged(ctx, &ETag::new(tag), &value).await? {
                println!("{} Wrote {}", "✓".green(), r.path().as_str().bold());
            } else {
                println!(
                    "{} {} changed since the ETag was read",
                    "✗".red(),
                    r.path().as_str().bold()
                );
            }
        }
        None => {
            r.set(ctx, &value).await?;
            println!("{} Wrote {}", "✓".green(), r.path().as_str().bold());
        }
    }
    Ok(())
}

async fn cmd_update(
    ctx: &CallContext,
    client: &DatabaseClient,
    args: UpdateArgs,
) -> anyhow::Result<()> {
    let r = client.reference(&args.path)?;
    let values: BTreeMap<String, Value> = match parse_json(&args.values)? {
        Value::Object(map) => map.into_iter().collect(),
        other => anyhow::bail!("update expects a JSON object, got {other}"),
    };
    r.update(ctx, &values).await?;
    println!(
        "{} Updated {} children of {}",
        "✓".green(),
        values.len(),
        r.path().as_str().bold()
    );
    Ok(())
}

async fn cmd_push(ctx: &CallContext, client: &DatabaseClient, args: PushArgs) -> anyhow::Result<()> {
    let r = client.reference(&args.path)?;
    let child: Reference = match args.value {
        Some(text) => r.push(ctx, &parse_json(&text)?).await?,
        None => r.push_empty(ctx).await?,
    };
    println!("{} Pushed {}", "✓".green(), child.path().as_str().yellow());
    Ok(())
}

async fn cmd_incr(ctx: &CallContext, client: &DatabaseClient, args: IncrArgs) -> anyhow::Result<()> {
    let r = client.reference(&args.path)?;
    let by = args.by;
    let committed = r
        .transaction(ctx, |current: Option<i64>| {
            current
                .unwrap_or(0)
                .checked_add(by)
                .map(Some)
                .ok_or("counter would overflow")
        })
        .await?;
    println!(
        "{} {} = {}",
        "✓".green(),
        r.path().as_str().bold(),
        committed.unwrap_or(0)
    );
    Ok(())
}

async fn cmd_delete_iid(
    ctx: &CallContext,
    timeout_ms: Option<u64>,
    auth: AuthMethod,
    args: DeleteIidArgs,
) -> anyhow::Result<()> {
    let mut config = InstanceIdConfig::new(args.project);
    if let Some(endpoint) = args.endpoint {
        config.endpoint = endpoint;
    }
    let timeout = Duration::from_millis(timeout_ms.unwrap_or(30_000));
    let transport = HttpTransport::new(auth, timeout, rtdb_protocol::http::DEFAULT_USER_AGENT)?;
    let client = InstanceIdClient::new(&config, Arc::new(transport))?;
    client.delete_instance_id(ctx, &args.iid).await?;
    println!("{} Deleted instance id {}", "✓".green(), args.iid.yellow());
    Ok(())
}
