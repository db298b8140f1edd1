//! End-to-end origin resolution over in-memory documents

use checktex_document::{
    InMemoryFiles, LatexDocument, LatexParser, Origin, OriginError, TextPosition,
};
use regex::Regex;

fn parse(files: &[(&str, &str)]) -> LatexDocument {
    let files = files
        .iter()
        .fold(InMemoryFiles::new("/"), |acc, (path, content)| {
            acc.with_file(path, *content)
        });
    LatexParser::new(Box::new(files)).parse("/main.tex").unwrap()
}

fn assert_same_location(source: &Origin, text: &Origin) {
    assert_eq!(source.file(), text.file());
    assert_eq!(source.file_span(), text.file_span());
    assert_eq!(source.source_span(), text.source_span());
}

fn nested_files(b: &'static str) -> Vec<(&'static str, &'static str)> {
    vec![
        ("main.tex", "\\input{sub.tex}\n"),
        ("sub.tex", "\\input{A.tex}\n\\input{B.tex}\n\\input{C.tex}"),
        ("A.tex", "A0\nA1\nA2\n"),
        ("B.tex", b),
        ("C.tex", "C0\nC1\nC2"),
    ]
}

#[test]
fn test_single_file_source_and_text_agree() {
    let content = "0123\n\tBCD\nXYZ\n";
    let doc = parse(&[("main.tex", content)]);
    assert_eq!(doc.get_source(), content);
    assert_eq!(doc.get_text(), content);

    for i in 0..4 {
        let source = doc.get_origin_of_source(i, i + 1).unwrap();
        let text = doc.get_origin_of_text(i, i + 1).unwrap();
        assert_same_location(&source, &text);
        assert_eq!(source.file(), "/main.tex");
        assert_eq!(source.file_line(), 0);
        assert_eq!(source.begin().file.position.column, i);
        assert_eq!(source.end().file.position.column, i + 1);
    }
    for i in 5..8 {
        let source = doc.get_origin_of_source(i, i + 1).unwrap();
        let text = doc.get_origin_of_text(i, i + 1).unwrap();
        assert_same_location(&source, &text);
        assert_eq!(source.file_line(), 1);
        assert_eq!(text.text_span(), Some((i, i + 1)));
    }
}

#[test]
fn test_every_character_of_a_plain_document() {
    let content = "First line.\nSecond, longer line.\n\nFourth.";
    let doc = parse(&[("main.tex", content)]);
    for i in 0..content.len() {
        let source = doc.get_origin_of_source(i, i + 1).unwrap();
        let text = doc.get_origin_of_text(i, i + 1).unwrap();
        assert_same_location(&source, &text);
        assert_eq!(source.file_span(), (i, i + 1));
    }
}

#[test]
fn test_included_file() {
    let doc = parse(&[
        ("main.tex", "0123\n\\input{sub.tex}\nXYZ\n"),
        ("sub.tex", "ABC\n"),
    ]);

    for i in 0..4 {
        let source = doc.get_origin_of_source(i, i + 1).unwrap();
        assert_same_location(&source, &doc.get_origin_of_text(i, i + 1).unwrap());
        assert_eq!(source.file(), "/main.tex");
    }
    for i in 5..8 {
        let source = doc.get_origin_of_source(i, i + 1).unwrap();
        assert_same_location(&source, &doc.get_origin_of_text(i, i + 1).unwrap());
        assert_eq!(source.file(), "/sub.tex");
        assert_eq!(source.file_span(), (i - 5, i - 4));
    }

    let begin = doc.get_text().find("ABC").unwrap();
    let origin = doc.get_origin_of_text(begin, begin + 3).unwrap();
    assert_eq!(origin.file(), "/sub.tex");
    assert_eq!(origin.file_line(), 0);
    assert_eq!(origin.begin().file.position.column, 0);
    assert_eq!(origin.end().file.position.column, 3);
    assert_eq!(origin.to_string(), "/sub.tex[0:0-0:3]");
}

#[test]
fn test_nested_includes() {
    let doc = parse(&nested_files("B0\nB1\nB2\n"));
    assert_eq!(
        doc.files().collect::<Vec<_>>(),
        vec!["/main.tex", "/sub.tex", "/A.tex", "/B.tex", "/C.tex"]
    );

    for file in ["A", "B", "C"] {
        for i in 0..3 {
            let key = format!("{}{}", file, i);
            let p = doc.get_text().find(&key).unwrap();
            let origin = doc.get_origin_of_source(p, p + 1).unwrap();
            assert_same_location(&origin, &doc.get_origin_of_text(p, p + 1).unwrap());
            assert_eq!(origin.file(), format!("/{}.tex", file));
            assert_eq!(origin.file_span().0, 3 * i);
            assert_eq!(origin.file_line(), i);
        }
    }
}

#[test]
fn test_nested_includes_with_shifted_file() {
    let doc = parse(&nested_files("\nB1\nB2\n"));

    for file in ["A", "B", "C"] {
        for i in 0..3 {
            let key = format!("{}{}", file, i);
            if key == "B0" {
                continue;
            }
            let shift = if file == "B" { 2 } else { 0 };
            let p = doc.get_text().find(&key).unwrap();
            let origin = doc.get_origin_of_source(p, p + 1).unwrap();
            assert_eq!(origin.file(), format!("/{}.tex", file));
            assert_eq!(origin.file_span(), (3 * i - shift, 3 * i + 1 - shift));
        }
    }
}

#[test]
fn test_find_is_restartable() {
    let doc = parse(&[
        ("main.tex", "The ABC and\n\\input{sub}\nanother ABC."),
        ("sub.tex", "Sub ABC\n"),
    ]);
    let pattern = Regex::new("ABC").unwrap();

    let first: Vec<Origin> = doc.find_in_source(&pattern).map(Result::unwrap).collect();
    let second: Vec<Origin> = doc.find_in_source(&pattern).map(Result::unwrap).collect();
    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
    assert_eq!(
        first.iter().map(Origin::file).collect::<Vec<_>>(),
        vec!["/main.tex", "/sub.tex", "/main.tex"]
    );

    let in_text: Vec<Origin> = doc.find_in_text(&pattern).map(Result::unwrap).collect();
    assert_eq!(in_text.len(), 3);
    for (source, text) in first.iter().zip(&in_text) {
        assert_same_location(source, text);
    }
}

#[test]
fn test_range_bounds() {
    let doc = parse(&[("main.tex", "0123\n\tBCD\nXYZ\n")]);
    let len = doc.get_source().len();

    assert_eq!(
        doc.get_origin_of_source(4, 4),
        Err(OriginError::EmptyRange { begin: 4, end: 4 })
    );
    assert_eq!(
        doc.get_origin_of_text(4, 4),
        Err(OriginError::EmptyRange { begin: 4, end: 4 })
    );
    assert!(doc.get_origin_of_source(len - 1, len).is_ok());
    assert!(doc.get_origin_of_text(len - 1, len).is_ok());
    assert_eq!(
        doc.get_origin_of_text(0, len + 1),
        Err(OriginError::OutOfBounds {
            offset: len + 1,
            len
        })
    );
}

#[test]
fn test_cross_file_tie_break() {
    // "bbb\n" from B with the first byte of A right after it
    let doc = parse(&[
        ("main.tex", "\\input{B}\\input{A}"),
        ("B.tex", "bbb\n"),
        ("A.tex", "aaa"),
    ]);
    assert_eq!(doc.get_source(), "bbb\naaa");

    let origin = doc.get_origin_of_source(0, 5).unwrap();
    assert_eq!(origin.file(), "/B.tex");
    assert_eq!(origin.file_span(), (0, 4));
    assert_eq!(origin.source_span(), (0, 4));
}

#[test]
fn test_macro_arguments_map_into_the_macro() {
    let doc = parse(&[(
        "main.tex",
        "We \\emph{really} mean it, see \\cite{knuth}.\n",
    )]);
    assert_eq!(doc.get_text(), "We really mean it, see [0].\n");

    let begin = doc.get_text().find("really").unwrap();
    let origin = doc.get_origin_of_text(begin, begin + "really".len()).unwrap();
    assert_eq!(origin.file_span(), (9, 15));
    assert_eq!(
        origin.begin().text,
        Some(TextPosition::new(begin, 0, begin))
    );

    let begin = doc.get_text().find("[0]").unwrap();
    let origin = doc.get_origin_of_text(begin, begin + 3).unwrap();
    assert_eq!(origin.file_span(), (30, 33));
}

#[test]
fn test_comments_keep_origins_exact() {
    let doc = parse(&[(
        "main.tex",
        "% header\nalpha % note\n%%PAUSE-CHECKING\nskipped\n%%CONTINUE-CHECKING\nbeta\n",
    )]);
    assert_eq!(doc.get_source(), "alpha \nbeta\n");

    let pattern = Regex::new("beta").unwrap();
    let origin = doc.find_in_text(&pattern).next().unwrap().unwrap();
    assert_eq!(origin.file_line(), 5);
    assert_eq!(
        doc.get_file_line("/main.tex", origin.file_line()),
        Some("beta\n")
    );
}

#[test]
fn test_document_is_shared_between_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<LatexDocument>();

    let doc = parse(&[
        ("main.tex", "0123\n\\input{sub.tex}\nXYZ\n"),
        ("sub.tex", "ABC\n"),
    ]);
    let expected: Vec<Origin> = (0..doc.get_text().len() - 1)
        .map(|i| doc.get_origin_of_text(i, i + 1).unwrap())
        .collect();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let origins: Vec<Origin> = (0..doc.get_text().len() - 1)
                    .map(|i| doc.get_origin_of_text(i, i + 1).unwrap())
                    .collect();
                assert_eq!(origins, expected);
            });
        }
    });
}

#[test]
fn test_change_markup_reaches_checkers_resolved() {
    let content = "A \\added{new} B \\deleted{gone} C \\replaced{fresh}{stale} D \\todo{fix me} E\n";
    let doc = parse(&[("main.tex", content)]);
    assert_eq!(doc.get_source(), "A new B  C fresh D  E\n");
    assert_eq!(doc.get_text(), doc.get_source());

    let pattern = Regex::new("fresh").unwrap();
    let origin = doc.find_in_text(&pattern).next().unwrap().unwrap();
    let begin = content.find("fresh").unwrap();
    assert_eq!(origin.file_span(), (begin, begin + 5));
    let removed = Regex::new("gone|stale|fix").unwrap();
    assert_eq!(doc.find_in_source(&removed).count(), 0);
}
