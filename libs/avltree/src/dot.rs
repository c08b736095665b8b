use crate::utils::Side;
use crate::AvlTree;
use core::fmt;

/// Displays an [`AvlTree`] in [graphviz format].
///
/// Every node becomes a `record` with three fields: `f0` and `f1` are the anchors of the left and
/// right child edges, `f2` carries the key, the subtree count, the `[min ; max]` bounds of the
/// subtree and the balance factor.
///
/// [graphviz format]: https://graphviz.org/doc/info/lang.html
pub struct Dot<'a, T> {
    pub(crate) tree: &'a AvlTree<T>,
}

impl<T> fmt::Display for Dot<'_, T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("digraph Groove{\n")?;
        f.write_str("  node [shape = record,height = .1];\n")?;

        f.write_str("  // all the nodes\n")?;
        for node in self.tree.inorder() {
            let tag = node.tag();
            writeln!(
                f,
                r#"  node{key}[label="<f0>|<f2> {key}\n{count}\n [ {min}  ;  {max} ]\n{balance} |<f1>"];"#,
                key = node.key(),
                count = tag.count(),
                min = tag.min(),
                max = tag.max(),
                balance = node.balance(),
            )?;
        }

        f.write_str("  // all the edges\n")?;
        for node in self.tree.inorder() {
            for side in Side::BOTH {
                if let Some(child) = node.child(side) {
                    writeln!(
                        f,
                        r#"  "node{}":f{} -> "node{}":f2;"#,
                        node.key(),
                        side.index(),
                        child.key()
                    )?;
                }
            }
        }

        f.write_str("}\n")
    }
}

impl<T> fmt::Debug for Dot<'_, T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
