use super::error::TocError;
use super::section::{Levels, parse_page};
use super::split::{
    is_numeric, letter_ordinal, split_line, strip_appendix_prefix, strip_nonnumeric,
};
use super::stitch::Transition;
use super::*;

impl PageText {
    fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

fn toc_page(entries: usize) -> PageText {
    let mut lines = vec!["Contents".to_string()];
    for index in 1..=entries {
        lines.push(format!("{index} Chapter Title {index} {}", index * 10));
    }
    PageText::from_lines(lines)
}

fn body_page(heading: &str) -> PageText {
    PageText::from_lines([
        heading,
        "Some running prose that does not end with a number.",
        "More prose follows here as well.",
        "And the paragraph continues.",
    ])
}

#[derive(Debug, Default)]
struct RecordingSink {
    items: Vec<(String, usize, Option<usize>)>,
}

impl OutlineSink for RecordingSink {
    type Handle = usize;
    type Error = std::convert::Infallible;

    fn add_item(
        &mut self,
        label: &str,
        page_index: usize,
        parent: Option<usize>,
    ) -> std::result::Result<usize, Self::Error> {
        self.items.push((label.to_string(), page_index, parent));
        Ok(self.items.len() - 1)
    }
}

#[test]
fn section_number_parses_dotted_levels() {
    let full = SectionNumber::parse("5.2.2").unwrap();
    assert_eq!(full, SectionNumber::Numbered(Levels::new(5, 2, 2)));

    let chapter = SectionNumber::parse("7").unwrap();
    assert_eq!(chapter.levels(), Levels::new(7, 0, 0));

    let section = SectionNumber::parse("3.4").unwrap();
    assert_eq!(section.levels(), Levels::new(3, 4, 0));
    assert!(!section.is_appendix());
}

#[test]
fn section_number_strips_glued_text_and_trailing_dot() {
    assert_eq!(
        SectionNumber::parse("Chapter3.1").unwrap().levels(),
        Levels::new(3, 1, 0)
    );
    assert_eq!(
        SectionNumber::parse("4.").unwrap().levels(),
        Levels::new(4, 0, 0)
    );
}

#[test]
fn section_number_parses_lettered_appendix() {
    let appendix = SectionNumber::parse("Appendix B.1").unwrap();
    assert!(appendix.is_appendix());
    assert_eq!(appendix.levels(), Levels::new(2, 1, 0));

    let lowercase = SectionNumber::parse("appendix c").unwrap();
    assert_eq!(
        lowercase,
        SectionNumber::Appendix {
            levels: Levels::new(3, 0, 0),
            lettered: true,
        }
    );

    let numbered = SectionNumber::parse("Appendix 2.3").unwrap();
    assert_eq!(
        numbered,
        SectionNumber::Appendix {
            levels: Levels::new(2, 3, 0),
            lettered: false,
        }
    );
}

#[test]
fn section_number_rejects_unparseable_components() {
    assert!(matches!(
        SectionNumber::parse("1..2"),
        Err(TocError::Parse { .. })
    ));
    assert!(matches!(
        SectionNumber::parse("Preface"),
        Err(TocError::Parse { .. })
    ));
    assert!(matches!(
        SectionNumber::parse("Appendix AB"),
        Err(TocError::Parse { .. })
    ));
}

#[test]
fn entry_rejects_non_integer_page() {
    assert!(Entry::new("1", "Intro", "xii").is_err());
    assert_eq!(Entry::new("1", "Intro", "12.").unwrap().page, 12);
}

#[test]
fn split_line_separates_section_title_and_page() {
    let split = split_line("5.3 Tensile Stress Strain Curves 88");
    assert_eq!(split.section, "5.3");
    assert_eq!(split.title, "Tensile Stress Strain Curves");
    assert_eq!(split.page, "88");

    let appendix = split_line("APPENDIX A Useful Tables 301");
    assert_eq!(appendix.section, "Appendix A");
    assert_eq!(appendix.title, "Useful Tables");
    assert_eq!(appendix.page, "301");

    let short = split_line("1 Introduction");
    assert_eq!(short.section, "1");
    assert_eq!(short.title, "");
    assert_eq!(short.page, "Introduction");
}

#[test]
fn numeric_classifier_accepts_sections_pages_and_appendices() {
    assert!(is_numeric("12"));
    assert!(is_numeric("1.2.3"));
    assert!(is_numeric("3."));
    assert!(is_numeric("Appendix B.2"));
    assert!(!is_numeric("Contents"));
    assert!(!is_numeric("87vi"));
    assert!(!is_numeric(""));
    assert!(!is_numeric("Appendix "));
    assert!(!is_numeric("B.2"));
}

#[test]
fn letter_helpers_map_alphabet_positions() {
    assert_eq!(letter_ordinal("A"), Some(1));
    assert_eq!(letter_ordinal("z"), Some(26));
    assert_eq!(letter_ordinal("AB"), None);
    assert_eq!(strip_appendix_prefix("Appendix C.1"), Some("C.1"));
    assert_eq!(strip_appendix_prefix("Appendices"), None);
}

#[test]
fn transition_table_covers_every_case() {
    use Transition::*;

    assert_eq!(Transition::classify(false, true, true), Complete);
    assert_eq!(Transition::classify(false, true, false), Open);
    assert_eq!(Transition::classify(true, false, false), Continue);
    assert_eq!(Transition::classify(true, false, true), Terminate);
    assert_eq!(Transition::classify(true, true, true), RepairComplete);
    assert_eq!(Transition::classify(true, true, false), RepairOpen);
    assert_eq!(Transition::classify(false, false, false), Skip);
    assert_eq!(Transition::classify(false, false, true), Skip);
}

#[test]
fn stitcher_parses_simple_entries() {
    let entries = stitch_entries([
        "1 Introduction 1",
        "1.1 Background 3",
        "1.1.1 Prior Work 5",
    ])
    .unwrap();

    let levels = entries.iter().map(Entry::levels).collect::<Vec<_>>();
    assert_eq!(
        levels,
        vec![
            Levels::new(1, 0, 0),
            Levels::new(1, 1, 0),
            Levels::new(1, 1, 1)
        ]
    );
    let pages = entries.iter().map(|entry| entry.page).collect::<Vec<_>>();
    assert_eq!(pages, vec![1, 3, 5]);
    assert_eq!(entries[2].title, "Prior Work");
}

#[test]
fn stitcher_merges_two_line_entry() {
    let entries = stitch_entries(["2.1 Methods continued", "from page 12 22"]).unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].levels(), Levels::new(2, 1, 0));
    assert_eq!(entries[0].title, "Methods continued from page 12");
    assert_eq!(entries[0].page, 22);
}

#[test]
fn stitcher_merges_entries_spanning_three_lines() {
    let entries = stitch_entries([
        "3.2 A Very Long Section",
        "Title That Wraps Across",
        "Several Lines 41",
        "3.3 Short 44",
    ])
    .unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(
        entries[0].title,
        "A Very Long Section Title That Wraps Across Several Lines"
    );
    assert_eq!(entries[0].page, 41);
    assert_eq!(entries[1].page, 44);
}

#[test]
fn stitcher_repairs_header_glued_onto_previous_entry() {
    let entries = stitch_entries([
        "5.2.2 Displacement Measurement Devices 87vi Contents",
        "5.3 Tensile Stress Strain Curves 88",
    ])
    .unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].levels(), Levels::new(5, 2, 2));
    assert_eq!(entries[0].title, "Displacement Measurement Devices");
    assert_eq!(entries[0].page, 87);
    assert_eq!(entries[1].levels(), Levels::new(5, 3, 0));
    assert_eq!(entries[1].page, 88);
}

#[test]
fn stitcher_repairs_then_opens_new_buffer() {
    let entries = stitch_entries([
        "4.1 Elastic Behaviour 60 Chapter Four",
        "4.2 Plastic Behaviour of",
        "Polycrystals 64",
    ])
    .unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].title, "Elastic Behaviour");
    assert_eq!(entries[0].page, 60);
    assert_eq!(entries[1].title, "Plastic Behaviour of Polycrystals");
    assert_eq!(entries[1].page, 64);
}

#[test]
fn stitcher_skips_non_toc_lines_and_drops_dangling_buffer() {
    let entries = stitch_entries([
        "Published by The Publishers Ltd.",
        "Homework problems 48",
        "1 Introduction 1",
        "2 Unfinished entry without",
    ])
    .unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].title, "Introduction");
}

#[test]
fn stitcher_propagates_parse_errors() {
    let result = stitch_entries([
        "1 Introduction 1",
        "2 Overflowing Page 99999999999999999999999",
    ]);
    assert!(matches!(result, Err(TocError::Parse { .. })));
}

#[test]
fn stitcher_is_deterministic() {
    let lines = [
        "1 Introduction 1",
        "1.1 Scope of the",
        "Work 2",
        "2 Methods 9vi Contents",
        "2.1 Setup 10",
    ];
    let first = stitch_entries(lines).unwrap();
    let second = stitch_entries(lines).unwrap();
    assert_eq!(first, second);
}

#[test]
fn detector_threshold_is_strictly_greater() {
    let detector = TocPageDetector::new(DetectorConfig::default()).unwrap();

    let four_of_five = ["1 A 1", "2 B 3", "3 C 5", "4 D 7", "Contents"]
        .map(String::from)
        .to_vec();
    assert!(detector.is_toc_page(&four_of_five));

    let three_of_four = ["1 A 1", "2 B 3", "3 C 5", "Contents"]
        .map(String::from)
        .to_vec();
    assert!(!detector.is_toc_page(&three_of_four));

    assert!(!detector.is_toc_page(&[]));
}

#[test]
fn detector_skips_short_first_page_and_stops_after_toc() {
    let short_front_matter = PageText::from_lines(["ISBN 978 0 12 345678 9", "Printed 2019"]);
    let pages = vec![
        body_page("Title Page"),
        short_front_matter,
        toc_page(12),
        toc_page(5),
        body_page("Introduction"),
        toc_page(12),
    ];

    let detector = TocPageDetector::new(DetectorConfig::default()).unwrap();
    let toc = detector.detect(&pages);

    assert_eq!(toc.pages, vec![2, 3]);
    assert_eq!(toc.first_page(), Some(2));
    assert_eq!(toc.lines.len(), 13 + 6);
}

#[test]
fn detector_reports_missing_toc() {
    let pages = vec![body_page("One"), body_page("Two")];
    let detector = TocPageDetector::new(DetectorConfig::default()).unwrap();
    assert!(detector.detect(&pages).is_empty());
}

#[test]
fn detector_honours_configured_thresholds() {
    let config = DetectorConfig {
        min_ratio: 0.5,
        min_first_page_lines: 2,
    };
    let detector = TocPageDetector::new(config).unwrap();
    let pages = vec![PageText::from_lines(["1 Intro 1", "Notes"])];
    assert!(detector.detect(&pages).is_empty());

    let pages = vec![PageText::from_lines(["1 Intro 1", "2 Body 4", "Notes"])];
    assert_eq!(detector.detect(&pages).pages, vec![0]);
}

#[test]
fn page_text_collapses_whitespace_and_drops_blank_lines() {
    let page = PageText::from_text("  1   Introduction      1\n\n   \n2 Methods\t\t9\n");
    assert_eq!(page.lines, vec!["1 Introduction 1", "2 Methods 9"]);
}

#[test]
fn calibration_shifts_pages_to_document_indices() {
    let entries = stitch_entries(["1 Introduction 1", "2 Methods 9"]).unwrap();
    let pages = vec![
        body_page("Cover"),
        body_page("Contents"),
        body_page("Preface"),
        body_page("Chapter 1"),
        PageText::from_lines(["Chapter 1", "Introduction", "Text"]),
    ];

    let calibration = calibrate(&pages, &entries, 0, &CalibratorConfig::default());

    let Calibration::Calibrated {
        page_index,
        delta,
        entries: shifted,
    } = calibration
    else {
        panic!("expected calibrated result");
    };
    assert_eq!(page_index, 4);
    assert_eq!(delta, 3);
    assert_eq!(shifted[0].page, 4);
    assert_eq!(shifted[1].page, 12);
    assert_eq!(entries[0].page, 1);
}

#[test]
fn calibration_only_searches_leading_lines_from_start_page() {
    let entries = stitch_entries(["1 Introduction 1"]).unwrap();
    let pages = vec![
        PageText::from_lines(["Contents", "1 Introduction 1"]),
        PageText::from_lines(["a", "b", "c", "Introduction"]),
        PageText::from_lines(["Introduction"]),
    ];

    let calibration = calibrate(&pages, &entries, 1, &CalibratorConfig::default());
    assert!(calibration.is_calibrated());
    assert_eq!(calibration.entries()[0].page, 2);
}

#[test]
fn calibration_miss_is_reported() {
    let entries = stitch_entries(["1 Introduction 1"]).unwrap();
    let pages = vec![body_page("Preface")];

    let calibration = calibrate(&pages, &entries, 0, &CalibratorConfig::default());
    assert!(!calibration.is_calibrated());
    assert_eq!(calibration.entries(), entries.as_slice());
}

#[test]
fn rendering_follows_level_format() {
    let chapter = Entry::new("1", "Introduction", "1").unwrap();
    let section = Entry::new("1.2", "Background", "3").unwrap();
    let subsection = Entry::new("1.2.3", "Prior Work", "5").unwrap();
    let appendix = Entry::new("Appendix B", "Tables", "300").unwrap();
    let appendix_section = Entry::new("Appendix B.1", "Steel", "301").unwrap();

    assert_eq!(chapter.to_string(), "Ch. 1 - Introduction (page 1)");
    assert_eq!(section.to_string(), "1.2 - Background (page 3)");
    assert_eq!(subsection.to_string(), "1.2.3 - Prior Work (page 5)");
    assert_eq!(appendix.to_string(), "Appendix B - Tables (page 300)");
    assert_eq!(appendix_section.to_string(), "B.1 - Steel (page 301)");
}

#[test]
fn rendered_labels_round_trip_through_splitter() {
    let entries = stitch_entries(["1.2 Background 3", "4.5.6 Deep Topic Name 77"]).unwrap();

    for entry in &entries {
        let split = split_line(&entry.to_string());
        let number = SectionNumber::parse(&split.section).unwrap();
        let page = parse_page(strip_nonnumeric(&split.page, true, true)).unwrap();
        assert_eq!(number.levels(), entry.levels());
        assert_eq!(page, entry.page);
    }

    let chapter = Entry::new("9", "Closing", "120").unwrap();
    let label = chapter.to_string();
    let without_prefix = label.trim_start_matches("Ch. ");
    let split = split_line(without_prefix);
    assert_eq!(SectionNumber::parse(&split.section).unwrap().levels(), chapter.levels());
    assert_eq!(
        parse_page(strip_nonnumeric(&split.page, true, true)).unwrap(),
        120
    );
}

#[test]
fn hierarchy_groups_entries_without_duplicates() {
    let entries = stitch_entries([
        "1 Introduction 1",
        "1.1 Background 3",
        "1.1.1 Prior Work 5",
        "1.1.2 Open Problems 6",
        "1.2 Outline 7",
        "2 Methods 9",
        "2.1 Setup 10",
        "3.1 Orphaned Section 20",
        "2.4.1 Orphaned Subsection 21",
        "Appendix A Tables 30",
        "Appendix A.1 Steel 31",
    ])
    .unwrap();

    let hierarchy = Hierarchy::build(&entries);

    assert_eq!(hierarchy.chapters.len(), 2);
    let first = &hierarchy.chapters[0];
    assert_eq!(first.entry.title, "Introduction");
    assert_eq!(first.sections.len(), 2);
    assert_eq!(first.sections[0].subsections.len(), 2);
    assert_eq!(first.sections[0].subsections[1].title, "Open Problems");
    assert_eq!(hierarchy.chapters[1].sections.len(), 1);

    let orphan_titles = hierarchy
        .orphans
        .iter()
        .map(|entry| entry.title.as_str())
        .collect::<Vec<_>>();
    assert_eq!(orphan_titles, vec!["Orphaned Section", "Orphaned Subsection"]);

    assert_eq!(hierarchy.appendices.len(), 1);
    assert_eq!(hierarchy.appendices[0].sections.len(), 1);
    assert_eq!(hierarchy.entry_count(), entries.len());
}

#[test]
fn emit_outline_nests_items_under_parents() {
    let entries = stitch_entries([
        "1 Introduction 1",
        "1.1 Background 3",
        "1.1.1 Prior Work 5",
        "2 Methods 9",
        "Appendix A Tables 30",
    ])
    .unwrap();
    let hierarchy = Hierarchy::build(&entries);

    let mut sink = RecordingSink::default();
    let added = emit_outline(&hierarchy, &mut sink, &OutlineOptions::default()).unwrap();

    assert_eq!(added, 6);
    assert_eq!(
        sink.items,
        vec![
            ("Ch. 1 - Introduction (page 1)".to_string(), 1, None),
            ("1.1 - Background (page 3)".to_string(), 3, Some(0)),
            ("1.1.1 - Prior Work (page 5)".to_string(), 5, Some(1)),
            ("Ch. 2 - Methods (page 9)".to_string(), 9, None),
            ("Appendices".to_string(), 30, None),
            ("Appendix A - Tables (page 30)".to_string(), 30, Some(4)),
        ]
    );
}

#[test]
fn recover_toc_runs_full_pipeline() {
    let mut toc_lines = vec!["Contents".to_string()];
    toc_lines.extend([
        "1 Introduction 1",
        "1.1 Background 2",
        "2 Methods 3",
        "2.1 Setup 3",
        "2.2 Measurement 4",
        "3 Results 5",
        "3.1 Tensile Tests 5",
        "3.2 Hardness 6",
        "4 Discussion 7",
        "5 Conclusions 8",
    ]
    .map(String::from));

    let pages = vec![
        body_page("Title"),
        PageText::from_lines(toc_lines),
        body_page("Preface"),
        PageText::from_lines(["1", "Introduction", "Opening paragraph"]),
        body_page("More"),
    ];

    let outcome = recover_toc(&pages, &TocConfig::default()).unwrap();
    let TocOutcome::Recovered(recovered) = outcome else {
        panic!("expected recovered toc");
    };

    assert_eq!(recovered.toc.pages, vec![1]);
    assert!(recovered.calibration.is_calibrated());
    assert_eq!(recovered.calibration.entries()[0].page, 3);
    assert_eq!(recovered.hierarchy.chapters.len(), 5);
    assert_eq!(recovered.hierarchy.entry_count(), 10);
}

#[test]
fn recover_toc_without_toc_is_not_found() {
    let pages = vec![body_page("One"), body_page("Two")];
    let outcome = recover_toc(&pages, &TocConfig::default()).unwrap();
    assert_eq!(outcome, TocOutcome::NotFound);
}

#[test]
fn appendix_labels_render_digits_when_not_lettered() {
    let zero = Entry::new("Appendix 0", "Notation", "200").unwrap();
    assert_eq!(zero.to_string(), "Appendix 0 - Notation (page 200)");

    let numbered = Entry::new("Appendix 2.3", "Load Cases", "210").unwrap();
    assert_eq!(numbered.to_string(), "2.3 - Load Cases (page 210)");

    let lettered = Entry::new("Appendix Z.1", "Last Table", "220").unwrap();
    assert_eq!(lettered.to_string(), "Z.1 - Last Table (page 220)");
}

#[test]
fn emit_outline_handles_appendix_zero() {
    let entries = stitch_entries(["1 Introduction 1", "Appendix 0 Notation 200"]).unwrap();
    let hierarchy = Hierarchy::build(&entries);

    let mut sink = RecordingSink::default();
    emit_outline(&hierarchy, &mut sink, &OutlineOptions::default()).unwrap();

    assert_eq!(
        sink.items,
        vec![
            ("Ch. 1 - Introduction (page 1)".to_string(), 1, None),
            ("Appendices".to_string(), 200, None),
            ("Appendix 0 - Notation (page 200)".to_string(), 200, Some(1)),
        ]
    );
}

#[test]
fn page_numbers_beyond_u32_are_parse_errors() {
    assert_eq!(
        Entry::new("1", "Introduction", "4294967295").unwrap().page,
        4_294_967_295
    );
    assert!(matches!(
        Entry::new("1", "Introduction", "4294967296"),
        Err(TocError::Parse { .. })
    ));
    assert!(matches!(
        stitch_entries(["1 Introduction 9223372036854775807"]),
        Err(TocError::Parse { .. })
    ));
}

#[test]
fn calibration_shift_saturates() {
    let entries = vec![Entry {
        title: "Introduction".to_string(),
        page: i64::MAX,
        number: SectionNumber::parse("1").unwrap(),
    }];
    let pages = vec![
        body_page("Cover"),
        body_page("Contents"),
        PageText::from_lines(["1", "Introduction"]),
    ];

    let calibration = calibrate(&pages, &entries, 0, &CalibratorConfig::default());

    assert!(calibration.is_calibrated());
    assert_eq!(calibration.entries()[0].page, i64::MAX);
}

#[test]
fn negative_targets_point_at_first_page() {
    let entries = vec![Entry {
        title: "Front Matter".to_string(),
        page: -3,
        number: SectionNumber::parse("1").unwrap(),
    }];
    let hierarchy = Hierarchy::build(&entries);

    let mut sink = RecordingSink::default();
    emit_outline(&hierarchy, &mut sink, &OutlineOptions::default()).unwrap();

    assert_eq!(sink.items[0].1, 0);
}

#[test]
fn classifier_rejects_glued_section_tokens_the_parser_tolerates() {
    assert!(!is_numeric("Chapter3.1"));
    assert_eq!(
        SectionNumber::parse("Chapter3.1").unwrap().levels(),
        Levels::new(3, 1, 0)
    );
}

#[test]
fn recover_toc_without_entries_reports_no_entries() {
    let mut toc_lines = vec!["Contents".to_string()];
    toc_lines.extend((1..=10).map(|index| format!("Figure caption number {index}")));

    let pages = vec![
        body_page("Title"),
        PageText::from_lines(toc_lines),
        body_page("Preface"),
    ];

    let outcome = recover_toc(&pages, &TocConfig::default()).unwrap();
    let TocOutcome::NoEntries(toc) = outcome else {
        panic!("expected toc without entries");
    };
    assert_eq!(toc.pages, vec![1]);
    assert_eq!(toc.lines.len(), 11);
}
