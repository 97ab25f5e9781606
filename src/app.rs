//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads settings and sets up logging
//! - parses CLI arguments
//! - runs the forecast/report pipeline, or the stock and sales commands
//! - prints text, JSON, or plots
//! - writes optional exports

use chrono::{Local, Utc};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{
    Command, ExportArgs, ForecastArgs, RangeArgs, ReportArgs, SalesArgs, SampleArgs, SellArgs,
    StockArgs,
};
use crate::config::Settings;
use crate::data::{SampleConfig, generate_sample, write_sample_csv};
use crate::domain::{DateRange, ForecastConfig, ReportConfig};
use crate::error::AppError;
use crate::inventory::StockFilter;

pub mod pipeline;

/// Entry point for the `ptrend` binary.
pub fn run() -> Result<(), AppError> {
    let settings = Settings::from_env()?;
    init_logging(&settings)?;

    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Forecast(args) => handle_forecast(args, &settings),
        Command::Report(args) => handle_report(args, &settings),
        Command::Export(args) => handle_export(args),
        Command::Stock(args) => handle_stock(args),
        Command::Sell(args) => handle_sell(args),
        Command::Sales(args) => handle_sales(args),
        Command::Sample(args) => handle_sample(args),
    }
}

/// Log to stderr so stdout stays clean for `--json`.
fn init_logging(settings: &Settings) -> Result<(), AppError> {
    let filter = EnvFilter::try_new(&settings.log_filter).map_err(|e| {
        AppError::input(format!("Invalid log filter '{}': {e}", settings.log_filter))
    })?;

    // A subscriber may already be installed (tests, embedding); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
    Ok(())
}

fn handle_forecast(args: ForecastArgs, settings: &Settings) -> Result<(), AppError> {
    let config = forecast_config_from_args(&args, settings)?;
    let run = pipeline::run_forecast(&config)?;

    if config.json {
        let json = serde_json::to_string_pretty(&run.forecast)
            .map_err(|e| AppError::io(format!("Failed to serialize forecast: {e}")))?;
        println!("{json}");
    } else {
        println!("{}", crate::report::format_forecast_summary(&run.forecast));
        print_notes(&run.stats);
    }

    if config.plot {
        let plot =
            crate::plot::render_ascii_plot(&run.forecast, config.plot_width, config.plot_height);
        println!("{plot}");
    }

    // Optional exports.
    if let Some(path) = &config.export_json {
        crate::io::export::write_forecast_json(path, &run.forecast)?;
    }
    if let Some(path) = &config.export_daily {
        crate::io::export::write_daily_csv(path, &run.forecast)?;
    }

    Ok(())
}

fn handle_report(args: ReportArgs, settings: &Settings) -> Result<(), AppError> {
    let config = report_config_from_args(&args, settings)?;
    let run = pipeline::run_report(&config)?;

    println!("{}", crate::report::format_profit_report(&run.report));
    let low_stock: Vec<_> = run.low_stock.iter().collect();
    println!("{}", crate::report::format_low_stock(&low_stock));
    println!("{}", crate::report::format_forecast_summary(&run.report.forecast));

    if config.per_product {
        println!("{}", crate::report::format_product_forecasts(&run.per_product));
    }

    if config.plot {
        let plot = crate::plot::render_ascii_plot(
            &run.report.forecast,
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    print_notes(&run.stats);
    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    let mut stats = pipeline::IngestStats::default();
    let range = date_range_from_args(&args.range)?;
    let (_, lines) = pipeline::load_joined(&args.stock, &args.sales, range, &mut stats)?;

    crate::io::export::write_sales_csv(&args.out, &lines)?;
    println!("Wrote {} sales to {}", lines.len(), args.out.display());
    print_notes(&stats);
    Ok(())
}

fn handle_stock(args: StockArgs) -> Result<(), AppError> {
    let filter = stock_filter_from_args(&args)?;
    let items = pipeline::list_stock(&args.stock, &filter)?;
    print!("{}", crate::report::format_stock_table(&items));
    Ok(())
}

fn handle_sell(args: SellArgs) -> Result<(), AppError> {
    let sold_at = Utc::now().naive_utc();
    let outcome = pipeline::run_sell(&args.stock, &args.sales, args.id, args.qty, sold_at)?;

    let item = &outcome.item;
    println!(
        "Sold {} {} of {} (sale {}). {:.2} {} left.",
        outcome.sale.quantity_sold, item.unit, item.name, outcome.sale.id, item.quantity, item.unit
    );
    Ok(())
}

fn handle_sales(args: SalesArgs) -> Result<(), AppError> {
    let mut stats = pipeline::IngestStats::default();
    let range = date_range_from_args(&args.range)?;
    let (_, lines) = pipeline::load_joined(&args.stock, &args.sales, range, &mut stats)?;

    let history = crate::report::sales_history(&lines);
    print!("{}", crate::report::format_sales_history(&history));
    print_notes(&stats);
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = SampleConfig {
        days: args.days,
        end: args.end.unwrap_or_else(|| Local::now().date_naive()),
        seed: args.seed,
        base: args.base,
        drift: args.drift,
        noise: args.noise,
        sales_per_day: args.sales_per_day,
    };
    let rows = generate_sample(&config)?;
    write_sample_csv(&args.out, &rows)?;

    println!("Wrote {} sample sales to {}", rows.len(), args.out.display());
    Ok(())
}

fn print_notes(stats: &pipeline::IngestStats) {
    for note in stats.notes() {
        println!("{note}");
    }
}

pub fn forecast_config_from_args(
    args: &ForecastArgs,
    settings: &Settings,
) -> Result<ForecastConfig, AppError> {
    Ok(ForecastConfig {
        sales_path: args.sales.clone(),
        stock_path: args.stock.clone(),
        range: date_range_from_args(&args.range)?,
        horizon_days: args.horizon.unwrap_or(settings.default_horizon_days),
        json: args.json,
        plot: args.plot,
        plot_width: args.width,
        plot_height: args.height,
        export_json: args.export_json.clone(),
        export_daily: args.export_daily.clone(),
    })
}

pub fn report_config_from_args(
    args: &ReportArgs,
    settings: &Settings,
) -> Result<ReportConfig, AppError> {
    Ok(ReportConfig {
        stock_path: args.stock.clone(),
        sales_path: args.sales.clone(),
        range: date_range_from_args(&args.range)?,
        horizon_days: args.horizon.unwrap_or(settings.default_horizon_days),
        per_product: args.per_product,
        plot: args.plot,
        plot_width: args.width,
        plot_height: args.height,
    })
}

fn date_range_from_args(args: &RangeArgs) -> Result<DateRange, AppError> {
    if let (Some(start), Some(end)) = (args.start, args.end) {
        if start > end {
            return Err(AppError::input(format!("--start {start} is after --end {end}.")));
        }
    }
    Ok(DateRange::new(args.start, args.end))
}

pub fn stock_filter_from_args(args: &StockArgs) -> Result<StockFilter, AppError> {
    if let (Some(min), Some(max)) = (args.min_price, args.max_price) {
        if min > max {
            return Err(AppError::input(format!("--min-price {min} is above --max-price {max}.")));
        }
    }
    Ok(StockFilter {
        name: args.name.clone(),
        unit: args.unit.clone(),
        min_price: args.min_price,
        max_price: args.max_price,
    })
}
