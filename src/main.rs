use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(version, about)]
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
struct Opt {
    #[arg(required = true)]
    /// BSD names of the disks to query (e.g. `disk0`, `disk2s1`).
    disks: Vec<String>,

    #[arg(long, default_value_t = 10)]
    /// Seconds to wait for Disk Arbitration before giving up on a disk.
    timeout: u64,

    #[arg(long)]
    /// Print results as JSON.
    json: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing::level_filters::LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .try_init()?;

    run(Opt::parse())
}

#[cfg(target_os = "macos")]
fn run(opt: Opt) -> anyhow::Result<()> {
    use anyhow::Context;
    use bb_disk_attributes::Lookup;
    use std::{ffi::CString, time::Duration};

    #[derive(serde::Serialize)]
    struct Record<'a> {
        disk: &'a str,
        #[serde(flatten)]
        lookup: Lookup,
    }

    let timeout = Duration::from_secs(opt.timeout);
    let mut records = Vec::with_capacity(opt.disks.len());

    for disk in &opt.disks {
        let bsd_name =
            CString::new(disk.as_str()).with_context(|| format!("Invalid disk name {disk:?}"))?;
        let lookup = bb_disk_attributes::query_timeout(&bsd_name, timeout)
            .with_context(|| format!("Failed to query {disk}"))?;

        if opt.json {
            records.push(Record { disk, lookup });
            continue;
        }

        match lookup {
            Lookup::Described(attrs) => {
                let removable = attrs
                    .removable
                    .map(|x| if x { "yes" } else { "no" })
                    .unwrap_or("-");
                println!(
                    "{disk}\tremovable: {removable}\tvendor: {}\tmodel: {}",
                    attrs.vendor.as_deref().unwrap_or("-"),
                    attrs.model.as_deref().unwrap_or("-"),
                );
            }
            Lookup::NotFound => println!("{disk}\tnot found"),
            Lookup::Unavailable => anyhow::bail!("Disk Arbitration is not available"),
        }
    }

    if opt.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    }

    Ok(())
}

#[cfg(not(target_os = "macos"))]
fn run(_: Opt) -> anyhow::Result<()> {
    anyhow::bail!("Disk Arbitration is only available on macOS")
}
