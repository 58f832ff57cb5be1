use learning_trails_engine::response::MemoryPageStatus;
use learning_trails_engine::styling::{AttributeKey, AttributeValue, Rgba};
use learning_trails_engine::xml::{SlimXmlElement, XmlAttributes};
use learning_trails_engine::{
    AssessmentState, AttributedStringStyle, AttributedStringStyler, BlockType,
    LearningAssessmentManager, LearningBlock, LearningTrail, MemoryStore, PageAssessmentStatus,
    PageStatusRecorder, ParseOptions, SlimXmlParser, SlimXmlParserDelegate,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

const COURSE: &str = r#"<trail name="course">
    <step name="start" type="context">
        <blocks>
            <block type="title">Getting started</block>
            <block type="text"><text>Read the <a href="https://example.com/guide">guide</a>.</text></block>
            <groupblock name="extra">
                <block type="title">Extra reading</block>
                <block type="text"><text>Optional</text></block>
            </groupblock>
        </blocks>
    </step>
    <step name="code" type="code">
        <blocks>
            <block type="code"><code>if ready {
draw()
} else {
wait()
}</code></block>
        </blocks>
    </step>
    <step name="check" type="check">
        <assessment/>
        <blocks>
            <block type="response" name="pick" subtype="multiple-choice" confirm="true">
                <prompt>Pick the even numbers</prompt>
                <option type="correct"><text>2</text></option>
                <option><text>3</text></option>
                <option type="correct"><text>4</text></option>
            </block>
        </blocks>
    </step>
</trail>"#;

fn course() -> LearningTrail {
    LearningTrail::parse(COURSE, &ParseOptions::default(), None).unwrap()
}

/// Captures the body of every `<block>`.
#[derive(Default)]
struct BlockCapture {
    captured: Vec<String>,
}

impl SlimXmlParserDelegate for BlockCapture {
    fn did_end_element(&mut self, element: &SlimXmlElement) {
        if element.name == "block" {
            self.captured.push(element.content.clone());
        }
    }

    fn should_capture_element_content(&mut self, name: &str, _attributes: &XmlAttributes) -> bool {
        name == "block"
    }
}

#[rstest]
#[case::empty_pair("<br></br>", "<br/>")]
#[case::self_closing("<br/>", "<br/>")]
#[case::nested("<text>a <b>bold</b> move</text>", "<text>a <b>bold</b> move</text>")]
#[case::attributes(r#"<a href="x?a=1&amp;b=2">go</a>"#, r#"<a href="x?a=1&amp;b=2">go</a>"#)]
#[case::entities("1 &lt; 2 &amp;&amp; 3 &gt; 2", "1 &lt; 2 &amp;&amp; 3 &gt; 2")]
#[case::empty_with_attributes(r#"<icon name="star"></icon>"#, r#"<icon name="star"/>"#)]
fn block_content_is_captured_losslessly(#[case] fragment: &str, #[case] expected: &str) {
    let xml = format!("<block>{fragment}</block>");
    let mut capture = BlockCapture::default();
    SlimXmlParser::new(&xml).parse(&mut capture).unwrap();
    assert_eq!(capture.captured, vec![expected.to_string()]);
}

#[test]
fn trail_structure() {
    let trail = course();
    let dump: Vec<String> = trail
        .steps
        .iter()
        .flat_map(|step| {
            let header = format!(
                "{} {} {:?}",
                step.identifier,
                step.step_type.display_name(),
                step.title
            );
            std::iter::once(header).chain(step.blocks().into_iter().map(|b| {
                format!(
                    "{}{} {} visible={}",
                    "  ".repeat(b.group_level + 1),
                    b.block_type.as_str(),
                    b.identifier,
                    b.initial_visible_state
                )
            }))
        })
        .collect();

    insta::assert_snapshot!(dump.join("\n"), @r#"
    start Context Some("Getting started")
      title block1 visible=true
      text block2 visible=true
      group extra visible=true
        text block4 visible=false
    code Code None
      code block5 visible=true
    check Check None
      response block6 visible=true
    "#);
}

#[test]
fn link_block_styles_link_with_tint() {
    let trail = course();
    let style = AttributedStringStyle::default();
    let text = trail.steps[0].blocks()[1].styled_text(&style).unwrap();

    assert_eq!(text.plain_text(), "Read the guide.");
    let link = text.runs().iter().find(|r| r.text == "guide").unwrap();
    assert_eq!(
        link.attributes.get(&AttributeKey::Link),
        Some(&AttributeValue::Text("https://example.com/guide".into()))
    );
    assert_eq!(
        link.attributes.get(&AttributeKey::ForegroundColor),
        Some(&AttributeValue::Color(Rgba::SYSTEM_BLUE))
    );
}

#[test]
fn code_block_is_indented_by_bracket_depth() {
    let trail = course();
    let style = AttributedStringStyle::default();
    let text = trail.steps[1].blocks()[0].styled_text(&style).unwrap();

    let unit = style.indent.indent_unit;
    let indents: Vec<f32> = text
        .runs()
        .iter()
        .filter(|r| r.is_code())
        .map(|r| r.paragraph_style().unwrap().first_line_head_indent)
        .collect();
    assert_eq!(indents, vec![0.0, unit, 0.0, unit, 0.0]);
}

#[test]
fn nested_style_cascade() {
    let style = AttributedStringStyle::new(12.0, Rgba::BLACK)
        .with_style(
            "outer",
            [
                (AttributeKey::ForegroundColor, AttributeValue::Color(Rgba::new(1.0, 0.0, 0.0, 1.0))),
                (AttributeKey::FontSize, AttributeValue::Number(12.0)),
            ]
            .into(),
        )
        .with_style(
            "inner",
            [(AttributeKey::ForegroundColor, AttributeValue::Color(Rgba::new(0.0, 0.0, 1.0, 1.0)))].into(),
        );

    let text = AttributedStringStyler::styled_text("<outer><inner>text</inner></outer>", &style).unwrap();
    let run = &text.runs()[0];
    assert_eq!(
        run.attributes.get(&AttributeKey::ForegroundColor),
        Some(&AttributeValue::Color(Rgba::new(0.0, 0.0, 1.0, 1.0)))
    );
    assert_eq!(run.attributes.get(&AttributeKey::FontSize), Some(&AttributeValue::Number(12.0)));
}

#[test]
fn collapsed_group_discloses_on_request() {
    let mut trail = course();
    let step = &mut trail.steps[0];
    let hidden: Vec<&LearningBlock> = step.blocks().into_iter().filter(|b| !b.initial_visible_state).collect();
    assert_eq!(hidden.len(), 1);

    assert!(step.set_group_disclosed("extra", true));
    assert!(step.blocks().iter().all(|b| b.initial_visible_state));
    assert_eq!(
        step.accessible_description(),
        "Getting started\nGetting started\nRead the guide.\nExtra reading\nOptional"
    );
}

#[test]
fn answering_and_restoring_a_quiz() {
    let mut trail = course();
    let mut store = MemoryStore::new();
    let mut manager = LearningAssessmentManager::new(MemoryPageStatus::default());

    let step = &trail.steps[2];
    let block = step.response_blocks()[0];
    assert_eq!(block.block_type, BlockType::Response);
    let mut response = step.response_for(block).unwrap();
    assert_eq!(response.identifier, "trail.course.check.pick");

    response.select_option(0, true);
    response.select_option(1, true);
    assert!(!response.is_submitted());
    response.confirm();
    manager.update_assessment_state_for(&mut trail, 2, &response);
    response.save_state(&mut store);

    assert_eq!(trail.steps[2].assessment_state, AssessmentState::PartiallyCompleted);
    assert_eq!(manager.recorder().status(), Some(PageAssessmentStatus::Fail));

    response.select_option(2, true);
    manager.update_assessment_state_for(&mut trail, 2, &response);
    response.save_state(&mut store);
    assert_eq!(trail.assessment_state(), AssessmentState::CompletedSuccessfully);
    assert_eq!(manager.recorder().status(), Some(PageAssessmentStatus::Pass));

    let mut reopened = course();
    reopened.load_response_state(&store);
    assert_eq!(
        reopened.steps[2].assessment_state,
        AssessmentState::CompletedSuccessfully
    );
    let restored = {
        let step = &reopened.steps[2];
        let mut response = step.response_for(step.response_blocks()[0]).unwrap();
        response.load_state(&store).unwrap();
        response
    };
    assert_eq!(restored.selected_indexes(), vec![0, 1, 2]);
    assert!(restored.is_confirmed);
}

#[test]
fn reload_diff_reports_changed_step() {
    let mut trail = course();
    let edited = LearningTrail::parse(
        &COURSE.replace("Pick the even numbers", "Pick every even number"),
        &ParseOptions::default(),
        None,
    )
    .unwrap();
    assert_eq!(trail.update_steps_from(edited), vec![2]);

    let truncated = LearningTrail::parse(
        r#"<trail name="course"><step name="start"/></trail>"#,
        &ParseOptions::default(),
        None,
    )
    .unwrap();
    assert_eq!(trail.update_steps_from(truncated), Vec::<usize>::new());
}
