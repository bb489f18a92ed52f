use message_format::skeleton::{DateTimeFormatOptions, FieldWidth, NumberFormatOptions};
use message_format::{
    CustomFormats, FormatError, FormatterOptions, MessageFormat, ParamValue, Part, PartType,
    TagPolicy, params,
};

fn format_in(pattern: &str, locale: &str, params: &message_format::Params) -> String {
    MessageFormat::with_locale(pattern, locale)
        .unwrap()
        .format(Some(params))
        .unwrap()
}

#[test]
fn resolved_locale() {
    assert_eq!(MessageFormat::new("").unwrap().resolved_options().locale, "en");
    assert_eq!(
        MessageFormat::with_locale("", "en-us").unwrap().resolved_options().locale,
        "en-US"
    );
    assert_eq!(
        MessageFormat::with_locale("", "EN-US").unwrap().resolved_options().locale,
        "en-US"
    );

    let mf = MessageFormat::try_new(
        "",
        &["fu-baz", "de-ch"],
        CustomFormats::default(),
        FormatterOptions::default(),
    )
    .unwrap();
    assert_eq!(mf.resolved_options().locale, "de-CH");
}

#[test]
fn languages_without_data_resolve_to_english() {
    for tag in ["zz", "xx-YY"] {
        let mf = MessageFormat::with_locale("{n, number}", tag).unwrap();
        assert_eq!(mf.resolved_options().locale, "en");
        assert_eq!(mf.format(Some(&params! { "n" => 1234.5 })).unwrap(), "1,234.5");
    }
}

#[test]
fn empty_pattern_formats_to_empty_string() {
    let mf = MessageFormat::new("").unwrap();
    assert_eq!(mf.format(None).unwrap(), "");
    assert_eq!(mf.format_to_parts(None).unwrap(), []);
}

#[test]
fn direct_arguments() {
    let mf = MessageFormat::new("My name is {FIRST} {LAST}.").unwrap();
    let output = mf
        .format(Some(&params! { "FIRST" => "Anthony", "LAST" => "Pipkin" }))
        .unwrap();
    assert_eq!(output, "My name is Anthony Pipkin.");
}

#[test]
fn zero_is_not_ignored() {
    let mf = MessageFormat::new("I am {age} years old.").unwrap();
    assert_eq!(mf.format(Some(&params! { "age" => 0 })).unwrap(), "I am 0 years old.");
}

#[test]
fn false_and_null_render_nothing() {
    let mf = MessageFormat::new("{a}{b}{c}").unwrap();
    let params = params! {
        "a" => false,
        "b" => ParamValue::null(),
        "c" => Option::<i32>::None,
    };
    assert_eq!(mf.format(Some(&params)).unwrap(), "");
}

#[test]
fn typed_arguments_with_default_formatters() {
    let mf = MessageFormat::new(
        "My name is {FIRST} {LAST}, age {age, number}, time {time, time}, date {date, date}.",
    )
    .unwrap();
    let ts = 12 * 3600 * 1000;
    let output = mf
        .format(Some(&params! {
            "FIRST" => "Anthony",
            "LAST" => "Pipkin",
            "age" => 8,
            "time" => ts,
            "date" => ParamValue::date(ts),
        }))
        .unwrap();
    assert_eq!(
        output,
        "My name is Anthony Pipkin, age 8, time 12:00:00\u{202f}PM, date 1/1/1970."
    );
}

#[test]
fn welsh_plurals() {
    let msg = "I have {numPeople, plural,\
        zero {zero points}\
        one {a point}\
        two {two points}\
        few {a few points}\
        many {lots of points}\
        other {some other amount of points}}.";
    let mf = MessageFormat::with_locale(msg, "cy").unwrap();
    let cases = [
        (0, "I have zero points."),
        (1, "I have a point."),
        (2, "I have two points."),
        (3, "I have a few points."),
        (6, "I have lots of points."),
        (100, "I have some other amount of points."),
    ];
    for (count, expected) in cases {
        assert_eq!(mf.format(Some(&params! { "numPeople" => count })).unwrap(), expected);
    }
}

#[test]
fn select_with_nested_plural() {
    let simple_fr = "{NAME} est {GENDER, select, female {allée} other {allé}} à {CITY}.";
    assert_eq!(
        format_in(
            simple_fr,
            "fr-FR",
            &params! { "NAME" => "Tony", "CITY" => "Paris", "GENDER" => "male" }
        ),
        "Tony est allé à Paris."
    );
    assert_eq!(
        format_in(
            simple_fr,
            "fr-FR",
            &params! { "NAME" => "Jenny", "CITY" => "Paris", "GENDER" => "female" }
        ),
        "Jenny est allée à Paris."
    );

    let complex_fr = "{TRAVELLERS} {TRAVELLER_COUNT, plural, \
        =1 {est {GENDER, select, female {allée} other {allé}}}\
        other {sont {GENDER, select, female {allées} other {allés}}}} à {CITY}.";
    let male = params! {
        "TRAVELLERS" => "Lucas, Tony and Drew",
        "TRAVELLER_COUNT" => 3,
        "GENDER" => "male",
        "CITY" => "Paris",
    };
    let female = params! {
        "TRAVELLERS" => "Monica",
        "TRAVELLER_COUNT" => 1,
        "GENDER" => "female",
        "CITY" => "Paris",
    };
    assert_eq!(
        format_in(complex_fr, "fr-FR", &male),
        "Lucas, Tony and Drew sont allés à Paris."
    );
    assert_eq!(format_in(complex_fr, "fr-FR", &female), "Monica est allée à Paris.");

    let complex_en = "{TRAVELLERS} went to {CITY}.";
    assert_eq!(format_in(complex_en, "en-US", &female), "Monica went to Paris.");
}

#[test]
fn counts_per_locale() {
    let en = "{COMPANY_COUNT, plural, =1 {One company} other {# companies}} published new books.";
    let mf = MessageFormat::with_locale(en, "en-US").unwrap();
    let cases = [
        (0, "0 companies published new books."),
        (1, "One company published new books."),
        (2, "2 companies published new books."),
        (10, "10 companies published new books."),
    ];
    for (count, expected) in cases {
        assert_eq!(mf.format(Some(&params! { "COMPANY_COUNT" => count })).unwrap(), expected);
    }

    let ru = "{COMPANY_COUNT, plural, \
        =1 {Одна компания опубликовала}\
        one {# компания опубликовала}\
        few {# компании опубликовали}\
        many {# компаний опубликовали}\
        other {# компаний опубликовали}} новые книги.";
    let mf = MessageFormat::with_locale(ru, "ru-RU").unwrap();
    let cases = [
        (0, "0 компаний опубликовали новые книги."),
        (1, "Одна компания опубликовала новые книги."),
        (2, "2 компании опубликовали новые книги."),
        (5, "5 компаний опубликовали новые книги."),
        (21, "21 компания опубликовала новые книги."),
    ];
    for (count, expected) in cases {
        assert_eq!(mf.format(Some(&params! { "COMPANY_COUNT" => count })).unwrap(), expected);
    }
}

#[test]
fn missing_values_name_the_variable() {
    let expected =
        "The intl string context variable 'STATE' was not provided to the string '{STATE}'";
    let mf = MessageFormat::new("{STATE}").unwrap();
    assert_eq!(mf.format(None).unwrap_err().to_string(), expected);
    assert_eq!(
        mf.format(Some(&params! { "ST ATE" => "Missouri" }))
            .unwrap_err()
            .to_string(),
        expected
    );
    assert_eq!(mf.format(Some(&params! { "STATE" => "Missouri" })).unwrap(), "Missouri");

    let mf = MessageFormat::new("{ST1ATE}").unwrap();
    assert!(matches!(
        mf.format(Some(&params! { "FOO" => "Missouri" })),
        Err(FormatError::MissingValue { name, .. }) if name == "ST1ATE"
    ));
}

#[test]
fn selectordinal() {
    let mf = MessageFormat::with_locale(
        "This is my {year, selectordinal, one{#st} two{#nd} few{#rd} other{#th}} birthday.",
        "en",
    )
    .unwrap();
    let cases = [
        (1, "1st"),
        (2, "2nd"),
        (3, "3rd"),
        (4, "4th"),
        (11, "11th"),
        (21, "21st"),
        (22, "22nd"),
        (33, "33rd"),
        (44, "44th"),
        (1024, "1,024th"),
    ];
    for (year, suffix) in cases {
        assert_eq!(
            mf.format(Some(&params! { "year" => year })).unwrap(),
            format!("This is my {suffix} birthday.")
        );
    }
}

#[test]
fn portuguese_plural_rules() {
    let msg = "{num, plural, one{one} other{other}}";
    assert_eq!(format_in(msg, "pt", &params! { "num" => 0 }), "one");
    assert_eq!(format_in(msg, "pt-MZ", &params! { "num" => 100 }), "other");
}

#[test]
fn plural_offset_and_exact_match() {
    let mf = MessageFormat::new(
        "{n, plural, offset:1 =0 {just you} =1 {you and one other} other {you and # others}}",
    )
    .unwrap();
    assert_eq!(mf.format(Some(&params! { "n" => 1 })).unwrap(), "just you");
    assert_eq!(mf.format(Some(&params! { "n" => 2 })).unwrap(), "you and one other");
    assert_eq!(mf.format(Some(&params! { "n" => 5 })).unwrap(), "you and 4 others");
}

#[test]
fn custom_formats() {
    let verbose = DateTimeFormatOptions {
        month: Some(FieldWidth::Long),
        day: Some(FieldWidth::Numeric),
        year: Some(FieldWidth::Numeric),
        hour: Some(FieldWidth::Numeric),
        minute: Some(FieldWidth::Numeric),
        second: Some(FieldWidth::Numeric),
        time_zone_name: Some(FieldWidth::Short),
        ..Default::default()
    };
    let formats = CustomFormats::default()
        .with_time("verbose", verbose.clone())
        .with_date("verbose", verbose)
        .with_number(
            "verbose",
            NumberFormatOptions {
                minimum_fraction_digits: Some(5),
                maximum_fraction_digits: Some(5),
                ..Default::default()
            },
        );

    let build = |pattern: &str| {
        MessageFormat::try_new(pattern, &["en"], formats.clone(), FormatterOptions::default())
            .unwrap()
    };
    let epoch = params! { "time" => 0 };
    let as_time = build("Today is {time, time, verbose}").format(Some(&epoch)).unwrap();
    assert!(as_time.starts_with("Today is January 1, 1970"), "{as_time}");
    assert!(as_time.contains("12:00:00\u{202f}AM"), "{as_time}");
    assert!(as_time.ends_with(" UTC"), "{as_time}");
    assert_eq!(
        build("Today is {time, date, verbose}").format(Some(&epoch)).unwrap(),
        as_time
    );
    assert_eq!(
        build("Today is {time, number, verbose}")
            .format(Some(&params! { "time" => 0.1234567 }))
            .unwrap(),
        "Today is 0.12346"
    );
}

#[test]
fn custom_formats_override_presets() {
    let formats = CustomFormats::default().with_number(
        "percent",
        NumberFormatOptions {
            maximum_fraction_digits: Some(1),
            ..Default::default()
        },
    );
    let options = FormatterOptions::default();
    let mf = MessageFormat::try_new("{x, number, percent}", &["en"], formats, options).unwrap();
    assert_eq!(mf.format(Some(&params! { "x" => 0.25 })).unwrap(), "0.3");
    assert_eq!(
        format_in("{x, number, percent}", "en", &params! { "x" => 0.25 }),
        "25%"
    );
}

#[test]
fn inline_skeletons() {
    let params = params! { "n" => 1234.5, "d" => ParamValue::date(0) };
    assert_eq!(format_in("{n, number, ::.00 group-off}", "en", &params), "1234.50");
    assert_eq!(format_in("{n, number, ::currency/EUR}", "en", &params), "€1,234.50");
    assert_eq!(format_in("{d, date, ::yMMMd}", "en", &params), "Jan 1, 1970");
    let time = format_in("{d, time, ::Hms}", "en", &params);
    assert!(time.ends_with("0:00:00") && !time.contains("AM"), "{time}");
}

#[test]
fn dates_use_the_resolved_locale() {
    let params = params! { "d" => ParamValue::date(0) };
    assert_eq!(
        format_in("{d, date, long}", "fr-FR", &params),
        "1 janvier 1970"
    );
    assert_eq!(format_in("{d, date, long}", "en", &params), "January 1, 1970");
    assert_eq!(format_in("{d, date, medium}", "en", &params), "Jan 1, 1970");
    assert_eq!(format_in("{d, date}", "en-US", &params), "1/1/1970");
}

#[test]
fn rich_arguments_keep_identity() {
    struct Element;

    let element = ParamValue::rich(Element);
    let parts = MessageFormat::with_locale("a react {element}", "en")
        .unwrap()
        .format_to_parts(Some(&params! { "element" => element.clone() }))
        .unwrap();
    assert_eq!(
        parts,
        [
            Part::Literal("a react ".to_owned()),
            Part::Argument(element.clone())
        ]
    );
    assert_eq!(parts[1].part_type(), PartType::Argument);
    let Part::Argument(value) = &parts[1] else {
        unreachable!()
    };
    assert!(value.as_rich().and_then(|rich| rich.downcast_ref::<Element>()).is_some());
}

#[test]
fn tags() {
    let params = params! { "name" => "Ann" };
    assert_eq!(
        MessageFormat::new("Hi <b>{name}</b>!")
            .unwrap()
            .format(Some(&params))
            .unwrap(),
        "Hi <b>Ann</b>!"
    );

    let ignoring = FormatterOptions::default().with_unknown_tags(TagPolicy::Ignore);
    let formats = CustomFormats::default();
    let mf = MessageFormat::try_new("Hi <b>{name}</b>!", &["en"], formats, ignoring).unwrap();
    assert_eq!(mf.format(Some(&params)).unwrap(), "Hi Ann!");

    #[derive(Debug, PartialEq)]
    struct Bold(String);

    let options = FormatterOptions::default().with_tag("b", |children| {
        let text: String = children.iter().map(ToString::to_string).collect();
        vec![Part::Argument(ParamValue::rich(Bold(text)))]
    });
    let mf = MessageFormat::try_new("Hi <b>{name}</b>!", &["en"], CustomFormats::default(), options)
        .unwrap();
    let parts = mf.format_to_parts(Some(&params)).unwrap();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0].as_literal(), Some("Hi "));
    let Part::Argument(value) = &parts[1] else {
        panic!("expected an argument part, got {parts:?}");
    };
    assert_eq!(
        value.as_rich().and_then(|rich| rich.downcast_ref::<Bold>()),
        Some(&Bold("Ann".to_owned()))
    );
    assert_eq!(parts[2].as_literal(), Some("!"));

    let literal_tags = FormatterOptions::default().with_ignore_tag(true);
    let mf = MessageFormat::try_new("a <b> c", &["en"], CustomFormats::default(), literal_tags)
        .unwrap();
    assert_eq!(mf.format(None).unwrap(), "a <b> c");
}

#[test]
fn value_type_errors() {
    let mf = MessageFormat::new("{n, plural, other {#}}").unwrap();
    assert!(matches!(
        mf.format(Some(&params! { "n" => "lots" })),
        Err(FormatError::InvalidValueType { .. })
    ));
    assert_eq!(mf.format(Some(&params! { "n" => "3" })).unwrap(), "3");

    let mf = MessageFormat::new("{d, date}").unwrap();
    assert!(matches!(
        mf.format(Some(&params! { "d" => "yesterday" })),
        Err(FormatError::InvalidValueType { .. })
    ));
}

#[test]
fn formatter_is_shareable_across_threads() {
    let mf = std::sync::Arc::new(
        MessageFormat::with_locale("{n, plural, one {# item} other {# items}}", "en").unwrap(),
    );
    let handles: Vec<_> = (0..4)
        .map(|n| {
            let mf = std::sync::Arc::clone(&mf);
            std::thread::spawn(move || mf.format(Some(&params! { "n" => n })).unwrap())
        })
        .collect();
    let outputs: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(outputs, ["0 items", "1 item", "2 items", "3 items"]);
}
