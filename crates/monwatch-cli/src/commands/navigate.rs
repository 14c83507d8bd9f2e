use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::Args;
use console::Style;
use monwatch_core::cache::CacheIndex;
use monwatch_core::geometry::ViewportSize;
use monwatch_core::lod::{AnchorTransform, LodController, Placement, QualityOutcome, ZoomOutcome};
use monwatch_core::original::{resolve_promotion, PromotionResult};
use monwatch_core::raster::base_name;

use super::PromptGate;

/// One scripted view gesture.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    /// `in` / `out`: one wheel notch
    Wheel(i32),
    /// `zoom:F`: multiply zoom by F
    Zoom(f64),
    /// `q:P`: move the quality slider to P percent
    Quality(u8),
    /// `nudge:D`: move the quality slider by D percent
    Nudge(i32),
    /// `pan:DX:DY`: drag by a screen-space delta
    Pan(f64, f64),
    /// `reset`: fit the image
    Reset,
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split(':');
        let head = parts.next().unwrap_or_default();
        let mut arg = |name: &str| {
            parts
                .next()
                .ok_or_else(|| format!("'{s}': missing {name}"))
                .map(str::to_string)
        };
        let action = match head {
            "in" => Self::Wheel(1),
            "out" => Self::Wheel(-1),
            "wheel" => Self::Wheel(parse(&arg("steps")?)?),
            "zoom" => Self::Zoom(parse(&arg("factor")?)?),
            "q" | "quality" => Self::Quality(parse(&arg("percent")?)?),
            "nudge" => Self::Nudge(parse(&arg("delta")?)?),
            "pan" => {
                let dx = parse(&arg("dx")?)?;
                let dy = parse(&arg("dy")?)?;
                Self::Pan(dx, dy)
            }
            "reset" => Self::Reset,
            other => return Err(format!("unknown action '{other}'")),
        };
        Ok(action)
    }
}

fn parse<T: FromStr>(value: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("invalid number '{value}'"))
}

#[derive(Args)]
pub struct NavigateArgs {
    /// Source TIFF file (its cached levels are used)
    pub source: PathBuf,

    /// Comma-separated gestures: in, out, wheel:N, zoom:F, q:P, nudge:D, pan:DX:DY, reset
    #[arg(long, value_delimiter = ',', default_value = "in")]
    pub actions: Vec<Action>,

    /// Cache directory
    #[arg(long)]
    pub cache: Option<PathBuf>,

    /// Viewport size used when loading the original
    #[arg(long, default_value = "1280x800")]
    pub viewport: ViewportSize,

    /// Config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Confirm promotion to the original without asking
    #[arg(long, conflicts_with = "no")]
    pub yes: bool,

    /// Decline promotion to the original without asking
    #[arg(long)]
    pub no: bool,
}

pub fn run(args: &NavigateArgs) -> Result<()> {
    let config = super::load_config(args.config.as_deref())?;
    let cache_dir = args
        .cache
        .clone()
        .unwrap_or_else(|| config.paths.cache_dir.clone());
    let index = CacheIndex::new(cache_dir);
    let base = base_name(&args.source);

    let mut controller = LodController::new(config.viewport.clone());
    let mut gate = PromptGate::from_flags(args.yes, args.no);
    let headroom = config.original.detail_headroom;
    let label = Style::new().dim();

    let opened = controller
        .open_initial_level(&index, &base)
        .with_context(|| format!("No cached level for {base}; run `monwatch build` first"))?;
    print_transform("open", &opened);

    for action in &args.actions {
        let name = format!("{action:?}");
        match *action {
            Action::Wheel(steps) => {
                let outcome = controller.on_wheel(steps);
                apply_zoom(&name, outcome, &mut controller, &mut gate, args, headroom);
            }
            Action::Zoom(factor) => {
                let outcome = controller.on_zoom_delta(factor);
                apply_zoom(&name, outcome, &mut controller, &mut gate, args, headroom);
            }
            Action::Quality(percent) => {
                let outcome = controller.on_quality_slider_change(percent, &index);
                print_quality(&name, outcome);
            }
            Action::Nudge(delta) => {
                let outcome = controller.adjust_quality(delta, &index);
                print_quality(&name, outcome);
            }
            Action::Pan(dx, dy) => {
                let center = controller.on_pan(dx, dy);
                println!(
                    "{:<16}center ({:.1}, {:.1})",
                    label.apply_to(&name),
                    center.x,
                    center.y
                );
            }
            Action::Reset => match controller.reset_view() {
                Some(t) => print_transform(&name, &t),
                None => println!("{:<16}nothing to reset", label.apply_to(&name)),
            },
        }
    }

    let state = controller.state();
    println!();
    println!(
        "Final: zoom {:.3}, center ({:.1}, {:.1}), original {}",
        state.zoom, state.center.x, state.center.y, state.using_original
    );
    Ok(())
}

/// Print an applied zoom, or run the promotion gate for a threshold crossing.
fn apply_zoom(
    name: &str,
    outcome: ZoomOutcome,
    controller: &mut LodController,
    gate: &mut PromptGate,
    args: &NavigateArgs,
    headroom: f64,
) {
    let label = Style::new().dim();
    let requested_zoom = match outcome {
        ZoomOutcome::Applied(zoom) => {
            println!("{:<16}zoom {zoom:.3}", label.apply_to(name));
            return;
        }
        ZoomOutcome::PromotionRequested { requested_zoom, .. } => requested_zoom,
    };
    match resolve_promotion(
        controller,
        gate,
        &args.source,
        requested_zoom,
        args.viewport,
        headroom,
    ) {
        Ok(PromotionResult::Promoted(t)) => print_transform(name, &t),
        Ok(PromotionResult::Declined { zoom }) => {
            println!("{:<16}declined, zoom {zoom:.3}", label.apply_to(name))
        }
        Err(e) => println!("{:<16}original load failed: {e}", label.apply_to(name)),
    }
}

fn print_quality(name: &str, outcome: monwatch_core::error::Result<QualityOutcome>) {
    let label = Style::new().dim();
    match outcome {
        Ok(QualityOutcome::Unchanged { scale }) => {
            println!("{:<16}already x{scale}", label.apply_to(name))
        }
        Ok(QualityOutcome::Swapped { transform, .. }) => print_transform(name, &transform),
        Err(e) => println!("{:<16}{e}", label.apply_to(name)),
    }
}

fn print_transform(name: &str, transform: &AnchorTransform) {
    let label = Style::new().dim();
    let value = Style::new().bold();
    let placement = match transform.placement {
        Placement::Fit => "fit, zoom 1.000".to_string(),
        Placement::Anchored { zoom, center } => {
            format!("zoom {zoom:.3}, center ({:.1}, {:.1})", center.x, center.y)
        }
    };
    println!(
        "{:<16}{} {}x{}, {placement}",
        label.apply_to(name),
        value.apply_to(transform.scale),
        transform.buffer.width(),
        transform.buffer.height()
    );
}
