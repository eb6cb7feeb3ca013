//! `quill`: run path operations on SVG path-data strings.
//!
//! ```text
//! quill <unite|intersect|subtract|exclude|divide> <path-a> <path-b> [--even-odd] [--precision N]
//! quill <area|length|bounds> <path> [--even-odd] [--precision N]
//! ```

use anyhow::{Context, Result, anyhow, bail};
use quill_geom::{BooleanOp, FillRule, PathDataFormat, PathItem};

const USAGE: &str = "usage: quill <unite|intersect|subtract|exclude|divide> <path-a> <path-b> [--even-odd] [--precision N]
       quill <area|length|bounds> <path> [--even-odd] [--precision N]";

/// Parsed command line
#[derive(Debug, PartialEq)]
struct Invocation {
    command: String,
    operands: Vec<String>,
    fill_rule: FillRule,
    format: PathDataFormat,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Invocation> {
    let mut args = args.into_iter();
    let command = args.next().ok_or_else(|| anyhow!("missing command\n{USAGE}"))?;
    let mut operands = Vec::new();
    let mut fill_rule = FillRule::NonZero;
    let mut format = PathDataFormat::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--even-odd" => fill_rule = FillRule::EvenOdd,
            "--precision" => {
                let value = args.next().context("--precision needs a value")?;
                let precision = value
                    .parse()
                    .with_context(|| format!("invalid precision '{value}'"))?;
                format = format.with_precision(precision);
            }
            _ => operands.push(arg),
        }
    }
    Ok(Invocation {
        command,
        operands,
        fill_rule,
        format,
    })
}

fn operand(data: &str, fill_rule: FillRule) -> Result<PathItem> {
    let mut item = PathItem::from_path_data(data).with_context(|| format!("cannot parse path data '{data}'"))?;
    match &mut item {
        PathItem::Path(path) => path.set_fill_rule(fill_rule),
        PathItem::Compound(compound) => compound.set_fill_rule(fill_rule),
    }
    Ok(item)
}

fn expect_operands(invocation: &Invocation, count: usize) -> Result<()> {
    if invocation.operands.len() != count {
        bail!(
            "'{}' takes {} path argument(s), got {}\n{USAGE}",
            invocation.command,
            count,
            invocation.operands.len()
        );
    }
    Ok(())
}

/// Run a command and return the lines to print
fn run(invocation: &Invocation) -> Result<Vec<String>> {
    let command = invocation.command.as_str();
    match command {
        "area" | "length" | "bounds" => {
            expect_operands(invocation, 1)?;
            let item = operand(&invocation.operands[0], invocation.fill_rule)?;
            let line = match command {
                "area" => item.area().to_string(),
                "length" => item.length().to_string(),
                _ => match item.bounds() {
                    Some(bounds) => format!("{} {} {} {}", bounds.x, bounds.y, bounds.width, bounds.height),
                    None => "empty".to_string(),
                },
            };
            Ok(vec![line])
        }
        "divide" => {
            expect_operands(invocation, 2)?;
            let a = operand(&invocation.operands[0], invocation.fill_rule)?;
            let b = operand(&invocation.operands[1], invocation.fill_rule)?;
            let pieces = a.divide(&b)?;
            tracing::info!("divide produced {} pieces", pieces.len());
            Ok(pieces.iter().map(|piece| piece.to_path_data(&invocation.format)).collect())
        }
        _ => {
            let op: BooleanOp = command.parse().map_err(|_| anyhow!("unknown command '{command}'\n{USAGE}"))?;
            expect_operands(invocation, 2)?;
            let a = operand(&invocation.operands[0], invocation.fill_rule)?;
            let b = operand(&invocation.operands[1], invocation.fill_rule)?;
            let result = quill_geom::boolean::boolean(&a, &b, op)?;
            tracing::info!("{} produced {} contour(s)", op, result.paths().len());
            Ok(vec![result.to_path_data(&invocation.format)])
        }
    }
}

fn main() -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quill_geom=info,quill_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let invocation = parse_args(std::env::args().skip(1))?;
    for line in run(&invocation)? {
        println!("{line}");
    }
    Ok(())
}
