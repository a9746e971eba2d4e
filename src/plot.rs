//! Static SVG renderings of solved models.
//!
//! The siting plot is a scatter of the instance with built facilities highlighted and a line
//! for every farm to facility flow. The toy plot is an isometric view of the feasible box with
//! the face `x0 + x1 + x2 = 1` shaded and the optimum marked.

use crate::error::Result;
use crate::instance::{Instance, Point};
use crate::models::siting::{FacilityKind, SitingResult};
use crate::models::toy::{ToyResult, UPPER};
use std::fmt::{self, Write as _};
use std::path::Path;

/// Flows below this are not drawn
const FLOW_EPS: f64 = 1e-6;

/// Color for plot elements
#[derive(Debug, Clone, Copy)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert to CSS color string
    pub fn to_css(&self) -> String {
        format!("rgb({},{},{})", self.r, self.g, self.b)
    }

    pub const FARM: Color = Color::new(52, 168, 83);
    pub const URBAN: Color = Color::new(103, 58, 183);
    pub const WATER: Color = Color::new(66, 133, 244);
    pub const CANDIDATE: Color = Color::new(158, 158, 158);
    pub const SMALL: Color = Color::new(251, 188, 4);
    pub const LARGE: Color = Color::new(234, 67, 53);
    pub const FLOW: Color = Color::new(90, 90, 90);
}

#[derive(Debug, Clone)]
pub struct PlotConfig {
    pub width: u32,
    pub height: u32,
    pub margin: u32,
    pub title: Option<String>,
    pub point_radius: f64,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 700,
            height: 700,
            margin: 60,
            title: None,
            point_radius: 5.0,
        }
    }
}

impl PlotConfig {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }
}

/// Maps data coordinates to pixels inside the margins, y pointing up
struct Frame {
    x_off: f64,
    y_off: f64,
    width: f64,
    height: f64,
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

impl Frame {
    fn new(config: &PlotConfig, (x_min, x_max): (f64, f64), (y_min, y_max): (f64, f64)) -> Frame {
        let margin = config.margin as f64;
        Frame {
            x_off: margin,
            y_off: margin,
            width: config.width as f64 - 2.0 * margin,
            height: config.height as f64 - 2.0 * margin,
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    fn px(&self, x: f64, y: f64) -> (f64, f64) {
        let x_range = (self.x_max - self.x_min).max(f64::EPSILON);
        let y_range = (self.y_max - self.y_min).max(f64::EPSILON);
        (
            self.x_off + (x - self.x_min) / x_range * self.width,
            self.y_off + self.height - (y - self.y_min) / y_range * self.height,
        )
    }
}

fn header(svg: &mut String, config: &PlotConfig) -> fmt::Result {
    writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = config.width,
        h = config.height
    )?;
    writeln!(
        svg,
        r#"<rect width="100%" height="100%" fill="white"/>"#
    )?;
    if let Some(title) = &config.title {
        writeln!(
            svg,
            r#"<text x="{}" y="30" text-anchor="middle" font-family="sans-serif" font-size="18">{}</text>"#,
            config.width / 2,
            title
        )?;
    }
    Ok(())
}

fn legend(svg: &mut String, x: f64, y: f64, entries: &[(&str, Color)]) -> fmt::Result {
    for (i, (label, color)) in entries.iter().enumerate() {
        let ly = y + 18.0 * i as f64;
        writeln!(
            svg,
            r#"<rect x="{:.1}" y="{:.1}" width="10" height="10" fill="{}"/><text x="{:.1}" y="{:.1}" font-family="sans-serif" font-size="12">{}</text>"#,
            x,
            ly,
            color.to_css(),
            x + 16.0,
            ly + 10.0,
            label
        )?;
    }
    Ok(())
}

fn write_file(svg: &str, path: impl AsRef<Path>) -> Result<()> {
    std::fs::write(path, svg)?;
    Ok(())
}

/// Scatter plot of a solved siting instance
pub struct SitingPlot<'a> {
    config: PlotConfig,
    instance: &'a Instance,
    result: &'a SitingResult,
}

impl<'a> SitingPlot<'a> {
    pub fn new(config: PlotConfig, instance: &'a Instance, result: &'a SitingResult) -> Self {
        Self {
            config,
            instance,
            result,
        }
    }

    /// Data bounds, never smaller than the unit square
    fn bounds(&self) -> ((f64, f64), (f64, f64)) {
        let all = self
            .instance
            .farms
            .iter()
            .chain(&self.instance.urban_centers)
            .chain(&self.instance.water_bodies)
            .chain(&self.instance.candidates);
        all.fold(((0.0, 1.0), (0.0, 1.0)), |((x0, x1), (y0, y1)), p| {
            ((x0.min(p.x), x1.max(p.x)), (y0.min(p.y), y1.max(p.y)))
        })
    }

    fn circles(&self, svg: &mut String, frame: &Frame, points: &[Point], color: Color) -> fmt::Result {
        for p in points {
            let (x, y) = frame.px(p.x, p.y);
            writeln!(
                svg,
                r#"<circle cx="{:.1}" cy="{:.1}" r="{:.1}" fill="{}"/>"#,
                x,
                y,
                self.config.point_radius,
                color.to_css()
            )?;
        }
        Ok(())
    }

    pub fn to_svg(&self) -> Result<String> {
        let (xs, ys) = self.bounds();
        let frame = Frame::new(&self.config, xs, ys);
        let mut svg = String::new();
        header(&mut svg, &self.config)?;

        let (left, top) = frame.px(xs.0, ys.1);
        writeln!(
            svg,
            r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="none" stroke="black"/>"#,
            left, top, frame.width, frame.height
        )?;

        // flows first so the markers are drawn on top
        for (i, row) in self.result.x.iter().enumerate() {
            for (j, &flow) in row.iter().enumerate() {
                if flow <= FLOW_EPS {
                    continue;
                }
                let from = self.instance.farms[i];
                let to = self.instance.candidates[j];
                let (x1, y1) = frame.px(from.x, from.y);
                let (x2, y2) = frame.px(to.x, to.y);
                writeln!(
                    svg,
                    r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-width="1.5" stroke-opacity="{:.2}"/>"#,
                    x1,
                    y1,
                    x2,
                    y2,
                    Color::FLOW.to_css(),
                    flow.min(1.0)
                )?;
            }
        }

        for (j, p) in self.instance.candidates.iter().enumerate() {
            let (x, y) = frame.px(p.x, p.y);
            let (size, fill) = match self.result.facilities.get(j).copied().flatten() {
                Some(FacilityKind::Small) => (12.0, Color::SMALL.to_css()),
                Some(FacilityKind::Large) => (18.0, Color::LARGE.to_css()),
                None => (8.0, "none".to_string()),
            };
            writeln!(
                svg,
                r#"<rect x="{:.1}" y="{:.1}" width="{s:.1}" height="{s:.1}" fill="{}" stroke="{}"/>"#,
                x - size / 2.0,
                y - size / 2.0,
                fill,
                Color::CANDIDATE.to_css(),
                s = size
            )?;
        }

        self.circles(&mut svg, &frame, &self.instance.farms, Color::FARM)?;
        self.circles(&mut svg, &frame, &self.instance.urban_centers, Color::URBAN)?;
        self.circles(&mut svg, &frame, &self.instance.water_bodies, Color::WATER)?;

        legend(
            &mut svg,
            self.config.width as f64 - self.config.margin as f64 - 110.0,
            self.config.margin as f64 + 10.0,
            &[
                ("farm", Color::FARM),
                ("urban center", Color::URBAN),
                ("water body", Color::WATER),
                ("candidate", Color::CANDIDATE),
                ("small facility", Color::SMALL),
                ("large facility", Color::LARGE),
            ],
        )?;

        svg.push_str("</svg>\n");
        Ok(svg)
    }

    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        write_file(&self.to_svg()?, path)
    }
}

/// Isometric projection of `(x0, x1, x2)` onto the drawing plane
fn isometric(p: [f64; 3]) -> (f64, f64) {
    let (sin, cos) = std::f64::consts::FRAC_PI_6.sin_cos();
    ((p[0] - p[1]) * cos, p[2] - (p[0] + p[1]) * sin)
}

/// The feasible box of the toy LP and its optimum
pub struct ToyPlot<'a> {
    config: PlotConfig,
    result: &'a ToyResult,
}

impl<'a> ToyPlot<'a> {
    pub fn new(config: PlotConfig, result: &'a ToyResult) -> Self {
        Self { config, result }
    }

    pub fn to_svg(&self) -> Result<String> {
        let u = UPPER;
        let corners = (0..8)
            .map(|bits: usize| {
                [0, 1, 2].map(|axis| if bits >> axis & 1 == 1 { u } else { 0.0 })
            })
            .collect::<Vec<_>>();
        let projected = corners.iter().map(|&c| isometric(c)).collect::<Vec<_>>();

        let (x_min, x_max, y_min, y_max) = projected.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
            |(a, b, c, d), &(x, y)| (a.min(x), b.max(x), c.min(y), d.max(y)),
        );
        let frame = Frame::new(&self.config, (x_min, x_max), (y_min, y_max));
        let mut svg = String::new();
        header(&mut svg, &self.config)?;

        // edges of the box join corners differing in exactly one coordinate
        for (a, b) in (0..8usize).flat_map(|a| (0..3).map(move |axis| (a, a | 1 << axis))) {
            if a == b {
                continue;
            }
            let (x1, y1) = frame.px(projected[a].0, projected[a].1);
            let (x2, y2) = frame.px(projected[b].0, projected[b].1);
            writeln!(
                svg,
                r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="black" stroke-dasharray="4 3"/>"#,
                x1, y1, x2, y2
            )?;
        }

        // x0 + x1 + x2 = 1 cuts the box in a hexagon with vertices at permutations of (u, 1-u, 0)
        let v = 1.0 - u;
        let face = [
            [u, v, 0.0],
            [u, 0.0, v],
            [v, 0.0, u],
            [0.0, v, u],
            [0.0, u, v],
            [v, u, 0.0],
        ];
        let points = face
            .iter()
            .map(|&p| {
                let (x, y) = isometric(p);
                let (x, y) = frame.px(x, y);
                format!("{:.1},{:.1}", x, y)
            })
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(
            svg,
            r#"<polygon points="{}" fill="{}" fill-opacity="0.35" stroke="{}"/>"#,
            points,
            Color::WATER.to_css(),
            Color::WATER.to_css()
        )?;

        let (x, y) = isometric(self.result.x);
        let (x, y) = frame.px(x, y);
        writeln!(
            svg,
            r#"<circle cx="{:.1}" cy="{:.1}" r="{:.1}" fill="{}"/>"#,
            x,
            y,
            self.config.point_radius,
            Color::LARGE.to_css()
        )?;
        legend(
            &mut svg,
            self.config.margin as f64,
            self.config.height as f64 - self.config.margin as f64 + 10.0,
            &[("x0 + x1 + x2 = 1", Color::WATER), ("optimum", Color::LARGE)],
        )?;

        svg.push_str("</svg>\n");
        Ok(svg)
    }

    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        write_file(&self.to_svg()?, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::siting::Objectives;

    #[test]
    fn siting_plot_draws_every_point_and_flow() {
        let instance = Instance {
            farms: vec![Point::new(0.1, 0.1), Point::new(0.9, 0.1)],
            urban_centers: vec![Point::new(0.5, 0.9)],
            water_bodies: vec![],
            candidates: vec![Point::new(0.5, 0.1), Point::new(0.5, 0.5)],
        };
        let result = SitingResult {
            objectives: Objectives {
                transport: 0.8,
                safety: 0.8,
                water: 0.0,
                investment: 1.0,
            },
            scalar: 0.0,
            facilities: vec![Some(FacilityKind::Small), None],
            y: vec![vec![1.0, 0.0], vec![0.0, 0.0]],
            x: vec![vec![1.0, 0.0], vec![1.0, 0.0]],
            nearest_urban: vec![0.8],
            nearest_water: vec![],
        };

        let svg = SitingPlot::new(PlotConfig::new("siting"), &instance, &result)
            .to_svg()
            .unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("<circle").count(), 3);
        assert_eq!(svg.matches("<line").count(), 2);
        assert!(svg.contains(&Color::SMALL.to_css()));
    }

    #[test]
    fn toy_plot_draws_box_face_and_optimum() {
        let result = ToyResult {
            weights: [0.5, 0.2, 0.3],
            x: [0.0, UPPER, 1.0 - UPPER],
            objective: 0.0,
        };
        let svg = ToyPlot::new(PlotConfig::default(), &result).to_svg().unwrap();
        assert_eq!(svg.matches("<line").count(), 12);
        assert_eq!(svg.matches("<polygon").count(), 1);
        assert_eq!(svg.matches("<circle").count(), 1);
    }
}
