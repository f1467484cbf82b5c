use activity_dashboard::{Args, env_filter, log_filter, report_schema, run};
use anyhow::Context;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr so `--schema` output can be piped.
    let filter = log_filter(args.verbose);
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter(&filter))
        .init();
    tracing::debug!("activity-dashboard: log filter: {}", filter);

    if args.schema {
        println!("{}", report_schema()?);
        return Ok(());
    }

    let csv_path = args
        .csv_file
        .clone()
        .context("an activity CSV file is required")?;
    let generated_at = chrono::Local::now().naive_local();
    let summary = run(&csv_path, &args, generated_at)
        .with_context(|| format!("failed to build dashboard from {}", csv_path.display()))?;

    println!(
        "Wrote {} ({} activities, {} rows skipped)",
        summary.html_path.display(),
        summary.activities,
        summary.skipped_rows
    );
    if let Some(json) = &summary.json_path {
        println!("Wrote {}", json.display());
    }
    Ok(())
}
