use std::{fs::File, io::Write};

use graphviz_rust::{
    cmd::Format,
    dot_generator::{attr, edge, graph, id, node, node_id, stmt},
    dot_structures::*,
    printer::{DotPrinter, PrinterContext},
};
use uuid::Uuid;

use super::dfg_struct::DirectlyFollowsGraph;

///
/// Export the image of a [`DirectlyFollowsGraph`]
///
/// Also see [`export_dfg_image_svg`] and [`export_dfg_image_png`]
///
pub fn export_dfg_image<P: AsRef<std::path::Path>>(
    dfg: &DirectlyFollowsGraph<'_>,
    path: P,
    format: Format,
    dpi_factor: Option<f32>,
) -> Result<(), std::io::Error> {
    let g = export_dfg_to_dot_graph(dfg, dpi_factor);
    let out = graphviz_rust::exec(g, &mut PrinterContext::default(), vec![format.into()])?;
    let mut f = File::create(path)?;
    f.write_all(&out)?;
    Ok(())
}

///
/// Export a [`DirectlyFollowsGraph`] to a DOT graph (used in Graphviz)
///
pub fn export_dfg_to_dot_graph(dfg: &DirectlyFollowsGraph<'_>, dpi_factor: Option<f32>) -> Graph {
    let mut sorted_acts: Vec<_> = dfg.activities.iter().collect();
    // Start activities first, end activities last
    sorted_acts.sort_by_key(|(act, _)| {
        (
            !dfg.start_activities.contains(*act),
            dfg.end_activities.contains(*act),
        )
    });
    let activity_nodes: Vec<Stmt> = sorted_acts
        .into_iter()
        .map(|(x, &y)| {
            let mut counted_label = x.to_owned();
            counted_label.push_str(": ");
            counted_label.push_str(&y.to_string());
            let fill_color: String = if dfg.is_start_activity(x) && dfg.is_end_activity(x) {
                "\"#4B9969:#D4001F\"".into()
            } else if dfg.is_start_activity(x) {
                "\"#4B9969\"".into()
            } else if dfg.is_end_activity(x) {
                "\"#D4001F\"".into()
            } else {
                "\"white\"".into()
            };

            let (font_size, width) = (12, 1);
            stmt!(node!(esc &x; attr!("label", esc counted_label), attr!("gradientangle", "45"), attr!("shape","box"), attr!("fontsize",font_size),attr!("style","filled"), attr!("fillcolor",fill_color), attr!("width",width), attr!("height",0.5)))
        }).collect();

    let arcs: Vec<Stmt> = dfg
        .directly_follows_relations
        .iter()
        .map(|(dfr, &frequency)| {
            let attrs = if frequency == 1 {
                Vec::default()
            } else {
                vec![attr!("label", (format!("{frequency}")))]
            };
            stmt!(edge!(node_id!(esc dfr.0) => node_id!(esc dfr.1), attrs))
        })
        .collect();

    let mut global_graph_options = vec![stmt!(attr!("rankdir", "LR"))];
    if let Some(dpi_fac) = dpi_factor {
        global_graph_options.push(stmt!(attr!("dpi", (dpi_fac * 96.0))))
    }

    graph!(strict di id!(esc Uuid::new_v4()),vec![global_graph_options,activity_nodes, arcs].into_iter().flatten().collect())
}

///
/// Convert a DOT graph to a String containing the DOT source
///
pub fn graph_to_dot(g: &Graph) -> String {
    g.print(&mut PrinterContext::default())
}

///
/// Export the image of a [`DirectlyFollowsGraph`] as an SVG file
///
/// Also consider using [`DirectlyFollowsGraph::export_svg`] for convenience.
pub fn export_dfg_image_svg<P: AsRef<std::path::Path>>(
    dfg: &DirectlyFollowsGraph<'_>,
    path: P,
) -> Result<(), std::io::Error> {
    export_dfg_image(dfg, path, Format::Svg, None)
}

///
/// Export the image of a [`DirectlyFollowsGraph`] as a PNG file
///
/// Also consider using [`DirectlyFollowsGraph::export_png`] for convenience.
pub fn export_dfg_image_png<P: AsRef<std::path::Path>>(
    dfg: &DirectlyFollowsGraph<'_>,
    path: P,
) -> Result<(), std::io::Error> {
    export_dfg_image(dfg, path, Format::Png, Some(2.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dfg::dfg_struct::DirectlyFollowsGraph;

    #[test]
    fn dot_source_contains_activities_and_arcs() {
        let mut dfg = DirectlyFollowsGraph::new();
        dfg.add_activity("place order".into(), 2);
        dfg.add_activity("ship order".into(), 2);
        dfg.add_start_activity("place order".into());
        dfg.add_end_activity("ship order".into());
        dfg.add_df_relation("place order".into(), "ship order".into(), 2);

        let dot = graph_to_dot(&export_dfg_to_dot_graph(&dfg, None));
        assert!(dot.contains("place order"));
        assert!(dot.contains("ship order"));
        assert!(dot.contains("->"));
    }

    #[test]
    fn nodes_are_ordered_start_to_end() {
        let mut dfg = DirectlyFollowsGraph::new();
        for activity in ["s1", "s2", "m", "e"] {
            dfg.add_activity(activity.into(), 1);
        }
        dfg.add_start_activity("s1".into());
        dfg.add_start_activity("s2".into());
        dfg.add_end_activity("e".into());

        let dot = graph_to_dot(&export_dfg_to_dot_graph(&dfg, None));
        // Node statements come before arc statements, so the first occurrence of each
        // quoted activity name is its node statement
        let pos = |a: &str| dot.find(&format!("\"{a}\"")).unwrap();
        assert!(pos("s1") < pos("m"));
        assert!(pos("s2") < pos("m"));
        assert!(pos("m") < pos("e"));
    }
}
