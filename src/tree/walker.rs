use super::{IgnoreList, TreeNode, build_path};

/// Depth-first walk below `root`, calling `callback(node, full_path)` for
/// every reachable node except ignored ones.
///
/// The root itself is not reported; its path is `build_path(base, root.name())`
/// and every child path extends its parent's. The first callback error stops
/// the walk and is returned as-is. A missing root visits nothing.
pub fn walk<F, E>(
    root: Option<&dyn TreeNode>,
    base: &str,
    ignore: &IgnoreList,
    callback: &mut F,
) -> Result<(), E>
where
    F: FnMut(&dyn TreeNode, &str) -> Result<(), E>,
{
    let Some(root) = root else {
        return Ok(());
    };
    let root_path = build_path(base, root.name());
    walk_children(root, &root_path, ignore, callback)
}

fn walk_children<F, E>(
    node: &dyn TreeNode,
    path: &str,
    ignore: &IgnoreList,
    callback: &mut F,
) -> Result<(), E>
where
    F: FnMut(&dyn TreeNode, &str) -> Result<(), E>,
{
    for child in node.children(ignore) {
        let child_path = build_path(path, child.name());
        callback(child, &child_path)?;
        walk_children(child, &child_path, ignore, callback)?;
    }
    Ok(())
}

/// Collect every visited path in walk order, so enumeration can finish
/// before analysis starts. With `files_only`, directories are left out.
pub fn collect_paths(
    root: Option<&dyn TreeNode>,
    base: &str,
    ignore: &IgnoreList,
    files_only: bool,
) -> Vec<String> {
    let mut paths = Vec::new();
    let result: Result<(), std::convert::Infallible> =
        walk(root, base, ignore, &mut |node, path| {
            if !(files_only && node.is_dir()) {
                paths.push(path.to_string());
            }
            Ok(())
        });
    match result {
        Ok(()) => paths,
        Err(never) => match never {},
    }
}

#[cfg(test)]
#[path = "walker_test.rs"]
mod tests;
