use eregex::{rewrite, BlockLocator, Grammar, Join, LineLocator, Parser, Symbol, Word};

fn main() {
    let source = r#"class Point {
  final double x;
  final double y;
  final Map<String, List<int>> tags;

  Point(this.x, this.y, this.tags);
}
"#;

    let grammar = Grammar::new();
    let classes = BlockLocator::new(Join::new(vec![
        Symbol::new("class").into_rule(),
        grammar.word(),
    ]));
    let fields = LineLocator::new(Join::new(vec![
        Symbol::new("final").into_rule(),
        grammar.type_name(),
        Word.into_rule(),
    ]));

    let result = rewrite(source, 0, source.len(), &classes, |class, sink| {
        let name = class.header()?.as_join()?.get(1)?.content()?;
        let interior = class.interior()?;
        let body = rewrite(source, interior.start, interior.end, &fields, |field, sink| {
            let parts = field.header()?.as_join()?;
            let type_name = parts.get(1)?.as_type_name()?;
            if type_name.is_generic() {
                // reaches outside the field, so it is refused and reported
                let mut probe = eregex::Replacer::new(source, field.start(), field.end());
                probe.update(interior.start, interior.end, "");
                sink.extend(probe.into_diagnostics());
            }
            Some(format!(
                "pub {}: {},",
                parts.get(2)?.content()?,
                type_name.base().content()?
            ))
        })
        .collect_into(sink);
        Some(format!("struct {name} {{{body}}}\n"))
    });

    println!("Rewritten source:\n{}", result.output);

    if result.has_diagnostics() {
        match result.render("point.dart", source) {
            Ok(rendered) => eprintln!("{rendered}"),
            Err(e) => eprintln!("Failed to render diagnostics: {e}"),
        }
        match result.to_json() {
            Ok(json) => println!("Diagnostics as JSON:\n{json}"),
            Err(e) => eprintln!("Failed to serialize diagnostics: {e}"),
        }
    }
}
