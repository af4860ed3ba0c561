use std::collections::HashMap;
use std::{fs::File, io::Write};

use graphviz_rust::{
    cmd::Format,
    dot_generator::{attr, edge, graph, id, node, node_id, stmt},
    dot_structures::*,
    printer::PrinterContext,
};
use uuid::Uuid;

use super::ocdfg_struct::OCDirectlyFollowsGraph;

const DEFAULT_PALETTE: [&str; 8] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
];

///
/// Assign a color to every object type of the graph
///
/// Custom assignments in `custom_colors` win; all remaining object types are assigned
/// palette colors in alphabetical order.
///
pub fn assign_object_type_colors<'b>(
    ocdfg: &'b OCDirectlyFollowsGraph<'_>,
    custom_colors: &'b HashMap<String, String>,
) -> HashMap<&'b str, &'b str> {
    let mut ob_types: Vec<&str> = ocdfg
        .object_type_to_dfg
        .keys()
        .map(|t| t.as_str())
        .collect();
    ob_types.sort_unstable();
    let mut palette = DEFAULT_PALETTE.iter().cycle();
    ob_types
        .into_iter()
        .map(|ob_type| {
            let color = custom_colors
                .get(ob_type)
                .map(|c| c.as_str())
                .unwrap_or_else(|| palette.next().unwrap());
            (ob_type, color)
        })
        .collect()
}

///
/// Export an [`OCDirectlyFollowsGraph`] to a DOT graph with one edge color per object type
///
pub fn export_ocdfg_to_dot_graph(
    ocdfg: &OCDirectlyFollowsGraph<'_>,
    custom_colors: &HashMap<String, String>,
) -> Graph {
    let colors = assign_object_type_colors(ocdfg, custom_colors);

    let mut activities: Vec<&str> = ocdfg.all_activities().into_iter().collect();
    activities.sort_unstable();
    let activity_nodes: Vec<Stmt> = activities
        .into_iter()
        .map(|a| {
            stmt!(node!(esc a; attr!("shape", "box"), attr!("fontsize", 12)))
        })
        .collect();

    let mut ob_types: Vec<_> = ocdfg.object_type_to_dfg.iter().collect();
    ob_types.sort_by_key(|(ob_type, _)| ob_type.as_str());
    let arcs: Vec<Stmt> = ob_types
        .into_iter()
        .flat_map(|(ob_type, dfg)| {
            let color = format!("\"{}\"", colors[ob_type.as_str()]);
            dfg.directly_follows_relations
                .iter()
                .map(move |(dfr, &frequency)| {
                    let label = format!("\"{ob_type}: {frequency}\"");
                    stmt!(edge!(
                        node_id!(esc dfr.0) => node_id!(esc dfr.1),
                        vec![attr!("color", (color.clone())), attr!("fontcolor", (color.clone())), attr!("label", label)]
                    ))
                })
        })
        .collect();

    let global_graph_options = vec![stmt!(attr!("rankdir", "LR"))];
    graph!(di id!(esc Uuid::new_v4()), vec![global_graph_options, activity_nodes, arcs].into_iter().flatten().collect())
}

///
/// Export the image of an [`OCDirectlyFollowsGraph`]
///
pub fn export_ocdfg_image<P: AsRef<std::path::Path>>(
    ocdfg: &OCDirectlyFollowsGraph<'_>,
    path: P,
    format: Format,
    custom_colors: &HashMap<String, String>,
) -> Result<(), std::io::Error> {
    let g = export_ocdfg_to_dot_graph(ocdfg, custom_colors);
    let out = graphviz_rust::exec(g, &mut PrinterContext::default(), vec![format.into()])?;
    let mut f = File::create(path)?;
    f.write_all(&out)?;
    Ok(())
}

///
/// Export the image of an [`OCDirectlyFollowsGraph`] as an SVG file
///
pub fn export_ocdfg_image_svg<P: AsRef<std::path::Path>>(
    ocdfg: &OCDirectlyFollowsGraph<'_>,
    path: P,
) -> Result<(), std::io::Error> {
    export_ocdfg_image(ocdfg, path, Format::Svg, &HashMap::new())
}

///
/// Export the image of an [`OCDirectlyFollowsGraph`] as a PNG file
///
pub fn export_ocdfg_image_png<P: AsRef<std::path::Path>>(
    ocdfg: &OCDirectlyFollowsGraph<'_>,
    path: P,
) -> Result<(), std::io::Error> {
    export_ocdfg_image(ocdfg, path, Format::Png, &HashMap::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dfg::image_export::graph_to_dot;
    use crate::dfg::DirectlyFollowsGraph;

    #[test]
    fn custom_colors_override_the_palette() {
        let mut ocdfg = OCDirectlyFollowsGraph::new();
        let mut dfg = DirectlyFollowsGraph::new();
        dfg.add_activity("a".into(), 1);
        dfg.add_activity("b".into(), 1);
        dfg.add_df_relation("a".into(), "b".into(), 1);
        ocdfg.object_type_to_dfg.insert("order".into(), dfg);

        let custom: HashMap<String, String> =
            vec![("order".to_string(), "#123456".to_string())]
                .into_iter()
                .collect();
        let colors = assign_object_type_colors(&ocdfg, &custom);
        assert_eq!(colors["order"], "#123456");

        let dot = graph_to_dot(&export_ocdfg_to_dot_graph(&ocdfg, &custom));
        assert!(dot.contains("#123456"));
        assert!(dot.contains("order: 1"));
    }
}
