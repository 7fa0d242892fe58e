//! Prompt construction for the three artifact kinds.
//!
//! Every prompt demands a bare JSON object in a named shape; the
//! recovery layer handles the models that answer with fences or prose
//! anyway.

use daybreak_core::intake::SprintIntake;
use daybreak_core::lesson::DailyLesson;
use daybreak_core::plan::DayPlan;

const JSON_ONLY: &str =
    "Respond with only the JSON object. No markdown fences, no commentary before or after.";

fn or_unspecified(value: &str) -> &str {
    if value.trim().is_empty() {
        "not specified"
    } else {
        value
    }
}

// ---------------------------------------------------------------------------
// Master plan
// ---------------------------------------------------------------------------

pub fn master_plan_system(intake: &SprintIntake) -> String {
    format!(
        "You are an expert curriculum designer creating a multi-day coaching sprint. \
         You design day-by-day arcs where each day builds on the previous one. \
         Audience: {audience}. Tone: {tone}. {JSON_ONLY}",
        audience = or_unspecified(&intake.target_audience),
        tone = or_unspecified(&intake.tone),
    )
}

pub fn master_plan_user(intake: &SprintIntake) -> String {
    let days = intake.duration_days;
    format!(
        "Design the complete structure for this sprint.\n\n\
         Title: {title}\n\
         Description: {description}\n\
         Category: {category}\n\
         Duration: {days} days\n\
         Creator: {creator} ({bio})\n\
         Goals: {goals}\n\
         Special requirements: {requirements}\n\n\
         Return a JSON object with this exact shape:\n\
         {{\n\
           \"overview\": {{\n\
             \"phases\": [{{\"name\": \"...\", \"startDay\": 1, \"endDay\": 7, \"focus\": \"...\"}}],\n\
             \"progressionArc\": \"how the sprint progresses start to finish\"\n\
           }},\n\
           \"days\": [\n\
             {{\"day\": 1, \"theme\": \"...\", \"objective\": \"...\", \"keyTakeaways\": [\"...\"], \
              \"buildingBlocks\": \"what this day builds on\", \
              \"connections\": {{\"previous\": \"...\", \"next\": \"...\"}}}}\n\
           ]\n\
         }}\n\n\
         The days array must contain exactly {days} entries, numbered 1 through {days} \
         with no gaps and no duplicates.",
        title = intake.title,
        description = or_unspecified(&intake.description),
        category = or_unspecified(&intake.category),
        creator = intake.creator_name,
        bio = or_unspecified(&intake.creator_bio),
        goals = or_unspecified(&intake.goals),
        requirements = or_unspecified(&intake.special_requirements),
    )
}

// ---------------------------------------------------------------------------
// Daily lesson
// ---------------------------------------------------------------------------

pub fn lesson_system(intake: &SprintIntake) -> String {
    format!(
        "You are {creator}, writing a daily lesson for your coaching sprint \"{title}\". \
         Write in the first person, in this voice: {tone}. \
         The lesson is one continuous script the participant reads or listens to: \
         teaching, then an exercise, then a closing affirmation. {JSON_ONLY}",
        creator = intake.creator_name,
        title = intake.title,
        tone = or_unspecified(&intake.tone),
    )
}

pub fn lesson_user(intake: &SprintIntake, day_plan: &DayPlan, total_days: u32) -> String {
    format!(
        "Write the lesson for day {day} of {total_days}.\n\n\
         Theme: {theme}\n\
         Objective: {objective}\n\
         Key takeaways: {takeaways}\n\
         Builds on: {building_blocks}\n\
         Connection from yesterday: {previous}\n\
         Sets up tomorrow: {next}\n\
         Audience: {audience}\n\n\
         Return a JSON object with this exact shape:\n\
         {{\"day\": {day}, \"title\": \"...\", \"content\": \"the full lesson script\", \
          \"exercise\": \"today's exercise\", \"affirmation\": \"one-sentence affirmation\"}}",
        day = day_plan.day,
        theme = day_plan.theme,
        objective = day_plan.objective,
        takeaways = day_plan.key_takeaways.join("; "),
        building_blocks = or_unspecified(&day_plan.building_blocks),
        previous = or_unspecified(&day_plan.connections.previous),
        next = or_unspecified(&day_plan.connections.next),
        audience = or_unspecified(&intake.target_audience),
    )
}

// ---------------------------------------------------------------------------
// Daily email
// ---------------------------------------------------------------------------

pub fn email_system(intake: &SprintIntake) -> String {
    format!(
        "You are {creator}, writing the short daily email that accompanies a lesson in \
         your coaching sprint \"{title}\". The email nudges the participant to open \
         today's lesson; it does not repeat the whole lesson. Tone: {tone}. {JSON_ONLY}",
        creator = intake.creator_name,
        title = intake.title,
        tone = or_unspecified(&intake.tone),
    )
}

pub fn email_user(day_plan: &DayPlan, lesson: &DailyLesson) -> String {
    format!(
        "Write the email for day {day}.\n\n\
         Today's lesson is titled \"{lesson_title}\" and covers: {objective}\n\
         Theme: {theme}\n\n\
         Return a JSON object with this exact shape:\n\
         {{\"subject\": \"...\", \"content\": \"the email body\"}}",
        day = day_plan.day,
        lesson_title = lesson.title,
        objective = day_plan.objective,
        theme = day_plan.theme,
    )
}
