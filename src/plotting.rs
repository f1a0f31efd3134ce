use plotly::{
    common::{Anchor, Line, Mode, Title},
    layout::{Annotation, Axis, GridPattern, LayoutGrid},
    Layout, Plot, Scatter,
};

use crate::simulation::output::ExtractedSeries;

const COLORS: &[&str] = &[
    "green", "blue", "red", "purple", "orange", "yellow", "brown", "pink", "gray", "cyan",
];

/// Configuration options for plotting simulation results.
///
/// # Fields
///
/// * `title` - Title of the figure
/// * `width` - Width of the figure in pixels
/// * `height` - Height of one panel row in pixels
/// * `x_label` - Label of every x-axis
#[derive(Debug, Clone)]
pub struct PlotConfig {
    pub title: String,
    pub width: usize,
    pub height: usize,
    pub x_label: String,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            title: "Simulation Results".to_string(),
            width: 1000,
            height: 350,
            x_label: "Time (h)".to_string(),
        }
    }
}

#[bon::bon]
impl ExtractedSeries {
    /// Creates one figure with a subplot per panel, laid out on the panel grid.
    ///
    /// # Arguments
    ///
    /// * `config` - Optional figure configuration. Defaults to [`PlotConfig::default`].
    /// * `show` - Whether to open the figure in the browser. Defaults to false.
    ///
    /// # Returns
    ///
    /// The figure; write it with [`Plot::write_html`] or render it with [`Plot::to_html`].
    #[builder]
    pub fn plot(&self, config: Option<PlotConfig>, #[builder(default)] show: bool) -> Plot {
        let config = config.unwrap_or_default();
        let mut plot = Plot::new();
        let mut layout = Layout::new()
            .title(config.title.clone())
            .show_legend(true)
            .width(config.width)
            .height(config.height * self.grid.rows)
            .grid(
                LayoutGrid::new()
                    .rows(self.grid.rows)
                    .columns(self.grid.columns)
                    .pattern(GridPattern::Independent),
            );

        let mut color = 0;
        for (i, panel) in self.panels.iter().enumerate() {
            let x_axis = format!("x{}", i + 1);
            let y_axis = format!("y{}", i + 1);

            for series in panel.series.iter() {
                let trace = Scatter::new(self.time.clone(), series.values.clone())
                    .name(&series.label)
                    .mode(Mode::Lines)
                    .x_axis(&x_axis)
                    .y_axis(&y_axis)
                    .line(Line::new().width(2.0).color(COLORS[color % COLORS.len()]));
                plot.add_trace(trace);
                color += 1;
            }

            layout.add_annotation(
                Annotation::new()
                    .y_ref(format!("y{} domain", i + 1))
                    .y_anchor(Anchor::Bottom)
                    .y(1)
                    .text(format!("<b>{}</b>", panel.title))
                    .x_ref(format!("x{} domain", i + 1))
                    .x_anchor(Anchor::Center)
                    .x(0.5)
                    .show_arrow(false),
            );

            layout = with_panel_axes(
                layout,
                i,
                Axis::new().title(Title::from(config.x_label.as_str())),
                Axis::new().title(Title::from(panel.y_label.as_str())),
            );
        }

        plot.set_layout(layout);

        if show {
            plot.show();
        }

        plot
    }
}

/// Assigns the axis pair of panel `index`. Plotly addresses at most eight
/// axis pairs by name; further panels keep unlabeled axes.
fn with_panel_axes(layout: Layout, index: usize, x: Axis, y: Axis) -> Layout {
    match index {
        0 => layout.x_axis(x).y_axis(y),
        1 => layout.x_axis2(x).y_axis2(y),
        2 => layout.x_axis3(x).y_axis3(y),
        3 => layout.x_axis4(x).y_axis4(y),
        4 => layout.x_axis5(x).y_axis5(y),
        5 => layout.x_axis6(x).y_axis6(y),
        6 => layout.x_axis7(x).y_axis7(y),
        7 => layout.x_axis8(x).y_axis8(y),
        _ => layout,
    }
}
