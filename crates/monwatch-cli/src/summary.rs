use std::path::Path;

use console::Style;
use monwatch_core::pyramid::BuildReport;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    ok: Style,
    error: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            ok: Style::new().green(),
            error: Style::new().red(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_build_summary(source: &Path, cache_dir: &Path, report: &BuildReport) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Pyramid Cache"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(13)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Input"),
        s.path.apply_to(source.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Cache"),
        s.path.apply_to(cache_dir.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Succeeded"),
        s.ok.apply_to(report.succeeded.len())
    );
    if report.is_partial_failure() {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Failed"),
            s.error.apply_to(report.failures.len())
        );
    }
    println!();

    if !report.succeeded.is_empty() {
        println!("  {}", s.header.apply_to("Levels"));
        for path in &report.succeeded {
            let levels: Vec<_> = report
                .levels_for(path)
                .map(|l| format!("x{} {}x{}", l.scale, l.width, l.height))
                .collect();
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            println!(
                "    {:<24}{}",
                s.value.apply_to(name),
                s.label.apply_to(levels.join(", "))
            );
        }
        println!();
    }

    if report.is_partial_failure() {
        println!("  {}", s.header.apply_to("Failures"));
        for failure in &report.failures {
            println!("    {}", s.error.apply_to(failure));
        }
        println!();
    }
}
