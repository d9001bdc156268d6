//! The same statement rendered by a whitespace-preserving and a
//! whitespace-collapsing backend must reconcile to the same figures.

use payrec_core::{
    Diagnostic, Fidelity, PayoutStatementParser, RawDocument, StatementParser,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use std::str::FromStr;

const ROWS: &[(&str, &str, &str, &str, &str)] = &[
    ("2024/01/05", "18900.00", "2835", "435", "15630.00"),
    ("2024/01/06", "5000.00", "750", "115", "4135.00"),
    ("2024/01/09", "123400.00", "18510", "2838", "102052.00"),
    ("2024/01/12", "980.00", "147", "23", "810.00"),
    ("2024/01/20", "45000.00", "6750", "1035", "37215.00"),
];

fn grouped(digits: &str) -> String {
    let (int, frac) = digits.split_once('.').unwrap_or((digits, ""));
    let chars: Vec<char> = int.chars().collect();
    let mut out = String::new();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(*c);
    }
    if !frac.is_empty() {
        out.push('.');
        out.push_str(frac);
    }
    out
}

fn totals() -> [Decimal; 4] {
    let mut sums = [Decimal::ZERO; 4];
    for (_, g, c, f, n) in ROWS {
        for (i, v) in [g, c, f, n].iter().enumerate() {
            sums[i] += Decimal::from_str(v).unwrap();
        }
    }
    sums
}

fn delimited_text() -> String {
    let mut text = String::from("売上明細\n日付\n通貨\n金額\nコミッション\n決済サービス手数料\n純収益\n");
    for (date, g, c, f, n) in ROWS {
        text.push_str(&format!(
            "{date}\nJPY\n{}\n-{}\n-{}\n{}\n",
            grouped(g),
            grouped(c),
            grouped(f),
            grouped(n)
        ));
    }
    let [g, c, f, n] = totals();
    text.push_str(&format!("合計\n¥{g}\n¥-{c}\n¥-{f}\n¥{n}\n"));
    text
}

fn concatenated_text() -> String {
    let mut text = String::from("売上明細日付通貨金額コミッション決済サービス手数料純収益");
    for (date, g, c, f, n) in ROWS {
        text.push_str(&format!("{date}JPY{g}-{c}-{f}{n}"));
    }
    let [g, c, f, n] = totals();
    text.push_str(&format!("合計¥{g}¥-{c}¥-{f}¥{n}"));
    text
}

#[test]
fn both_fidelities_agree() {
    let parser = PayoutStatementParser::new().unwrap();

    let delimited = parser
        .parse(&RawDocument::new(delimited_text(), Fidelity::Delimited))
        .unwrap();
    let concatenated = parser
        .parse(&RawDocument::new(concatenated_text(), Fidelity::Concatenated))
        .unwrap();

    assert_eq!(delimited.rows.len(), ROWS.len());
    assert_eq!(concatenated.rows.len(), ROWS.len());

    for (a, b) in delimited.rows.iter().zip(&concatenated.rows) {
        assert_eq!(a.amounts, b.amounts);
    }

    assert_eq!(delimited.report.sums(), concatenated.report.sums());
    assert_eq!(delimited.report.totals_line_match, Some(true));
    assert_eq!(concatenated.report.totals_line_match, Some(true));
    assert_eq!(delimited.diagnostics, Vec::<Diagnostic>::new());
    assert_eq!(concatenated.diagnostics, Vec::<Diagnostic>::new());
}

#[test]
fn detection_picks_the_right_fidelity() {
    assert_eq!(RawDocument::detect(delimited_text()).fidelity(), Fidelity::Delimited);
    assert_eq!(
        RawDocument::detect(concatenated_text()).fidelity(),
        Fidelity::Concatenated
    );
}

#[test]
fn wrong_fidelity_is_caught_by_reconciliation() {
    let parser = PayoutStatementParser::new().unwrap();

    // Treating collapsed output as delimited finds no rows at all, and the
    // totals line exposes it
    let result = parser
        .parse(&RawDocument::new(concatenated_text(), Fidelity::Delimited))
        .unwrap();

    assert!(result.rows.is_empty());
    assert_eq!(result.report.totals_line_match, Some(false));
    let unparseable = result
        .diagnostics
        .iter()
        .filter(|d| matches!(d, Diagnostic::UnparseableRow { .. }))
        .count();
    assert_eq!(unparseable, ROWS.len());
    assert!(result.validate().is_err());
}

#[test]
fn spans_are_ordered_and_point_at_markers() {
    let parser = PayoutStatementParser::new().unwrap();
    let doc = RawDocument::new(concatenated_text(), Fidelity::Concatenated);
    let result = parser.parse(&doc).unwrap();

    for pair in result.rows.windows(2) {
        assert!(pair[0].span.end <= pair[1].span.start);
    }
    for row in &result.rows {
        assert_eq!(&doc.text()[row.span.start..row.span.start + 3], "JPY");
    }
}
