use anyhow::{bail, Context, Result};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use pv_aggregator::presentation::{BarChart, ChartSpec, LineChart, PieChart};
use std::f64::consts::{FRAC_PI_2, TAU};
use std::path::{Path, PathBuf};

/// Default categorical colours, one per series or slice.
const PALETTE: [RGBColor; 8] = [
    RGBColor(0x63, 0x6e, 0xfa),
    RGBColor(0xef, 0x55, 0x3b),
    RGBColor(0x00, 0xcc, 0x96),
    RGBColor(0xab, 0x63, 0xfa),
    RGBColor(0xff, 0xa1, 0x5a),
    RGBColor(0x19, 0xd3, 0xf3),
    RGBColor(0xff, 0x66, 0x92),
    RGBColor(0xb6, 0xe8, 0x80),
];

pub fn parse_hex_color(hex: &str) -> Result<RGBColor> {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        bail!("Expected a #rrggbb colour, got {:?}", hex);
    }
    let channel = |at: usize| {
        u8::from_str_radix(&digits[at..at + 2], 16)
            .with_context(|| format!("Invalid colour {:?}", hex))
    };
    Ok(RGBColor(channel(0)?, channel(2)?, channel(4)?))
}

fn palette(idx: usize) -> RGBColor {
    PALETTE[idx % PALETTE.len()]
}

/// Label for an x position if it sits on a category index.
fn category_label(categories: &[&str], x: f64) -> String {
    let idx = x.round();
    if (x - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    categories
        .get(idx as usize)
        .map(|c| c.to_string())
        .unwrap_or_default()
}

pub struct ChartRenderer {
    output_dir: PathBuf,
    size: (u32, u32),
}

impl ChartRenderer {
    pub fn new(output_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&output_dir)
            .with_context(|| format!("Failed to create {}", output_dir.display()))?;
        Ok(Self {
            output_dir,
            size: (900, 600),
        })
    }

    /// Draw a chart spec to `<name>.png`. Tables are not drawn and yield `None`.
    pub fn render(&self, name: &str, spec: &ChartSpec) -> Result<Option<PathBuf>> {
        let path = self.output_dir.join(format!("{}.png", name));
        match spec {
            ChartSpec::Pie(pie) => self.draw_pie(&path, pie)?,
            ChartSpec::Line(line) => self.draw_line(&path, line)?,
            ChartSpec::GroupedBar(bar) => self.draw_grouped_bar(&path, bar)?,
            ChartSpec::Table(_) => return Ok(None),
        }
        log::debug!("Rendered {:?} chart to {}", spec.kind(), path.display());
        Ok(Some(path))
    }

    fn draw_pie(&self, path: &Path, pie: &PieChart) -> Result<()> {
        let root = BitMapBackend::new(path, self.size).into_drawing_area();
        root.fill(&parse_hex_color(&pie.background.paper)?)?;

        let title = format!("{} {}", pie.title, pie.subtitle);
        let area = root.titled(&title, ("sans-serif", 28).into_font().color(&WHITE))?;

        let (width, height) = area.dim_in_pixel();
        let center = (width as f64 / 2.0, height as f64 / 2.0);
        let radius = width.min(height) as f64 * 0.33;
        let total: i64 = pie.slices.iter().map(|s| s.value.max(0)).sum();
        let label_style = ("sans-serif", 16)
            .into_font()
            .color(&WHITE)
            .pos(Pos::new(HPos::Center, VPos::Center));

        if total > 0 {
            let mut start = -FRAC_PI_2;
            for (idx, slice) in pie.slices.iter().enumerate() {
                let share = slice.value.max(0) as f64 / total as f64;
                let sweep = share * TAU;
                let mid = start + sweep / 2.0;

                // pulled slices move outward along their bisector
                let cx = center.0 + mid.cos() * radius * slice.pull;
                let cy = center.1 + mid.sin() * radius * slice.pull;

                let steps = ((share * 120.0).ceil() as usize).max(2);
                let mut points = vec![(cx as i32, cy as i32)];
                for step in 0..=steps {
                    let angle = start + sweep * step as f64 / steps as f64;
                    points.push((
                        (cx + radius * angle.cos()) as i32,
                        (cy + radius * angle.sin()) as i32,
                    ));
                }
                area.draw(&Polygon::new(points, palette(idx).filled()))?;

                let label_radius = radius * (1.0 + slice.pull) + 40.0;
                area.draw(&Text::new(
                    format!("{} ({:.1}%)", slice.label, share * 100.0),
                    (
                        (center.0 + mid.cos() * label_radius) as i32,
                        (center.1 + mid.sin() * label_radius) as i32,
                    ),
                    label_style.clone(),
                ))?;

                start += sweep;
            }
        }

        root.present()?;
        Ok(())
    }

    fn draw_line(&self, path: &Path, chart: &LineChart) -> Result<()> {
        let root = BitMapBackend::new(path, self.size).into_drawing_area();
        root.fill(&parse_hex_color(&chart.background.paper)?)?;

        let categories = chart.categories();
        let slots = categories.len().max(1) as f64;
        let y_max = chart
            .series
            .iter()
            .flat_map(|s| &s.points)
            .map(|p| p.y)
            .fold(0.0, f64::max)
            .max(1.0)
            * 1.1;

        let mut ctx = ChartBuilder::on(&root)
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(-0.5f64..(slots - 0.5), 0f64..y_max)?;
        ctx.plotting_area()
            .fill(&parse_hex_color(&chart.background.plot)?)?;

        let x_labels = |x: &f64| category_label(&categories, *x);
        ctx.configure_mesh()
            .x_labels(categories.len().max(1))
            .x_label_formatter(&x_labels)
            .x_desc(chart.x_label.as_str())
            .y_desc(chart.y_label.as_str())
            .bold_line_style(&WHITE.mix(0.2))
            .light_line_style(&WHITE.mix(0.05))
            .label_style(("sans-serif", 14).into_font().color(&WHITE))
            .axis_desc_style(("sans-serif", 16).into_font().color(&WHITE))
            .draw()?;

        for (idx, series) in chart.series.iter().enumerate() {
            let color = palette(idx);
            let points: Vec<(f64, f64)> = series
                .points
                .iter()
                .filter_map(|p| {
                    categories
                        .iter()
                        .position(|c| *c == p.x)
                        .map(|x| (x as f64, p.y))
                })
                .collect();

            ctx.draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))?
                .label(series.name.as_str())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });

            if chart.markers {
                ctx.draw_series(points.iter().map(|&p| Circle::new(p, 4, color.filled())))?;
            }
        }

        ctx.configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    }

    fn draw_grouped_bar(&self, path: &Path, chart: &BarChart) -> Result<()> {
        let root = BitMapBackend::new(path, self.size).into_drawing_area();
        root.fill(&parse_hex_color(&chart.background.paper)?)?;
        let area = root.titled(&chart.title, ("sans-serif", 26).into_font().color(&WHITE))?;

        let categories: Vec<&str> = chart.categories.iter().map(String::as_str).collect();
        let slots = categories.len().max(1) as f64;
        let y_max = chart
            .series
            .iter()
            .flat_map(|s| &s.values)
            .copied()
            .fold(0.0, f64::max)
            .max(1.0)
            * 1.1;

        let mut ctx = ChartBuilder::on(&area)
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(-0.5f64..(slots - 0.5), 0f64..y_max)?;
        ctx.plotting_area()
            .fill(&parse_hex_color(&chart.background.plot)?)?;

        let x_labels = |x: &f64| category_label(&categories, *x);
        ctx.configure_mesh()
            .disable_x_mesh()
            .x_labels(categories.len().max(1))
            .x_label_formatter(&x_labels)
            .x_desc(chart.x_label.as_str())
            .y_desc(chart.y_label.as_str())
            .bold_line_style(&WHITE.mix(0.2))
            .light_line_style(&WHITE.mix(0.05))
            .label_style(("sans-serif", 14).into_font().color(&WHITE))
            .axis_desc_style(("sans-serif", 16).into_font().color(&WHITE))
            .draw()?;

        let width = 0.8 / chart.series.len().max(1) as f64;
        for (j, series) in chart.series.iter().enumerate() {
            let color = palette(j);
            let offset = -0.4 + j as f64 * width;
            ctx.draw_series(series.values.iter().enumerate().map(|(i, &value)| {
                let x0 = i as f64 + offset;
                Rectangle::new([(x0, 0.0), (x0 + width, value.max(0.0))], color.filled())
            }))?
            .label(series.name.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
        }

        ctx.configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        let color = parse_hex_color("#363b4f").unwrap();
        assert_eq!((color.0, color.1, color.2), (0x36, 0x3b, 0x4f));
        assert!(parse_hex_color("#363b4").is_err());
        assert!(parse_hex_color("#zz3b4f").is_err());
    }

    #[test]
    fn test_category_label_only_on_whole_positions() {
        let categories = ["January", "February"];
        assert_eq!(category_label(&categories, 1.0), "February");
        assert_eq!(category_label(&categories, 0.5), "");
        assert_eq!(category_label(&categories, 2.0), "");
        assert_eq!(category_label(&categories, -1.0), "");
    }
}
