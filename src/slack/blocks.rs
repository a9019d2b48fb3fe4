//! Slack Block Kit message builders.
//!
//! The survey form and its confirmation are static content; these helpers
//! only assemble them into `slack-morphism` block types.

use slack_morphism::prelude::{
    SlackActionBlockElement, SlackActionId, SlackActionsBlock, SlackBlock,
    SlackBlockButtonElement, SlackBlockCheckboxesElement, SlackBlockChoiceItem, SlackBlockId,
    SlackBlockPlainText, SlackBlockPlainTextInputElement, SlackBlockPlainTextOnly,
    SlackBlockText, SlackDividerBlock, SlackInputBlock, SlackInputBlockElement,
    SlackSectionBlock,
};

use crate::models::survey::{
    SurveyResponses, INTERESTS_ACTION_ID, OTHER_ACTION_ID, PAST_FAVOURITES_ACTION_ID,
    SUBMIT_ACTION_ID, TOPICS_ACTION_ID,
};

/// Notification fallback text of the survey message.
pub const SURVEY_FALLBACK_TEXT: &str = "Workplace check-in";

/// Text the survey message is replaced with once submitted.
pub const SUBMISSION_CONFIRMED_TEXT: &str = "Thank you for your submission!";

const INTRO_TEXT: &str = ":wave: Hey!\n\nWe're planning this year's community events \
     and would love a minute of your time to help shape them.";

const INTEREST_OPTIONS: [&str; 5] = [
    "Participating in a hackathon",
    "Giving a talk (we are always looking for speakers and will provide coaching and prep help!)",
    "Volunteering to help on the day of events (greeting, AV, moving chairs)",
    "Being on-call as a backup speaker in case someone drops out",
    "Creating or curating content (like slides, graphics, or notes) for community use",
];

fn plain(text: &str) -> SlackBlockPlainText {
    SlackBlockPlainText::new(text.to_owned()).with_emoji(true)
}

fn label(text: &str) -> SlackBlockPlainTextOnly {
    SlackBlockPlainTextOnly::from(plain(text))
}

fn free_text_question(action_id: &str, question: &str) -> SlackBlock {
    let element = SlackBlockPlainTextInputElement::new(SlackActionId(action_id.to_owned()))
        .with_multiline(true);
    SlackInputBlock::new(label(question), SlackInputBlockElement::PlainTextInput(element))
        .with_block_id(SlackBlockId(format!("{action_id}_block")))
        .with_optional(true)
        .into()
}

fn interests_question() -> SlackBlock {
    let options = INTEREST_OPTIONS
        .iter()
        .enumerate()
        .map(|(index, text)| {
            SlackBlockChoiceItem::new(SlackBlockText::Plain(plain(text)), format!("value-{index}"))
        })
        .collect();
    let element =
        SlackBlockCheckboxesElement::new(SlackActionId(INTERESTS_ACTION_ID.to_owned()), options);
    SlackInputBlock::new(
        label("Which of the following could you be interested in this year?"),
        SlackInputBlockElement::Checkboxes(element),
    )
    .with_block_id(SlackBlockId("interests_block".to_owned()))
    .with_optional(true)
    .into()
}

fn submit_button() -> SlackBlock {
    let button = SlackBlockButtonElement::new(
        SlackActionId(SUBMIT_ACTION_ID.to_owned()),
        label("Submit"),
    )
    .with_style("primary".to_owned());
    SlackBlock::Actions(
        SlackActionsBlock::new(vec![SlackActionBlockElement::Button(button)])
            .with_block_id(SlackBlockId("submit_block".to_owned())),
    )
}

/// Build the interactive survey form.
#[must_use]
pub fn survey_blocks() -> Vec<SlackBlock> {
    vec![
        SlackBlock::Section(
            SlackSectionBlock::new().with_text(SlackBlockText::Plain(plain(INTRO_TEXT))),
        ),
        interests_question(),
        free_text_question(
            TOPICS_ACTION_ID,
            "What are some topics/themes you'd want to hear talks about this year?",
        ),
        SlackBlock::Divider(SlackDividerBlock::new()),
        free_text_question(
            PAST_FAVOURITES_ACTION_ID,
            "Were there any talks/topics from 2024 that particularly resonated with you?",
        ),
        free_text_question(OTHER_ACTION_ID, "Anything else you'd like to share?"),
        submit_button(),
    ]
}

/// Build the blocks that replace the form after a submission.
#[must_use]
pub fn submission_confirmed_blocks() -> Vec<SlackBlock> {
    vec![SlackBlock::Section(SlackSectionBlock::new().with_text(
        SlackBlockText::MarkDown(format!(":white_check_mark: {SUBMISSION_CONFIRMED_TEXT}").into()),
    ))]
}

/// Format the summary posted to the notification channel.
#[must_use]
pub fn submission_summary(user_id: &str, responses: &SurveyResponses) -> String {
    format!(
        "<@{user_id}>\n\n\
         Willing to: {}\n\
         Future topics: {}\n\
         Fav 2024: {}\n\
         Other: {}\n",
        responses.joined_selection(INTERESTS_ACTION_ID, ", "),
        responses.text_or_none(TOPICS_ACTION_ID),
        responses.text_or_none(PAST_FAVOURITES_ACTION_ID),
        responses.text_or_none(OTHER_ACTION_ID),
    )
}
