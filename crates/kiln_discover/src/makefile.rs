//! Static makefile emission for the discovered unit set.
//!
//! A pure serialization convenience: no cache interaction, no side effects.

use crate::discover::SourceMap;

/// Renders a static makefile building every discovered unit's object file and
/// linking them into `out`.
///
/// Emits an `objects :=` list, one pattern rule per recognized source suffix,
/// and the final link rule.
pub fn generate_makefile(sources: &SourceMap, out: &str) -> String {
    let objects: Vec<String> = sources
        .values()
        .filter_map(|source| source.target())
        .map(|path| path.display().to_string())
        .collect();

    let mut lines = Vec::new();
    lines.push(format!("objects := {}", objects.join(" ")));
    lines.push("%.o: %.cpp\n\t$(CC) $(CFLAGS) -c -o $@ $^".to_string());
    lines.push("%.o: %.cc\n\t$(CC) $(CFLAGS) -c -o $@ $^".to_string());
    lines.push(format!("{out}: $(objects)\n\t$(CC) $(CFLAGS) $(LDFLAGS) -o $@ $^"));

    lines.join("\n\n")
}
