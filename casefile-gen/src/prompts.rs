//! Prompt builders for each pipeline step.
//!
//! One function per generation step. Structured steps (clues, map) instruct
//! the model to answer with a single JSON object so [`crate::parse`] can
//! extract it deterministically.

use casefile_core::{CaseMap, Difficulty, Location, Suspect};

/// Step 1: base narrative.
pub fn story_prompt(difficulty: Difficulty) -> String {
    format!(
        "Write a self-contained murder mystery narrative suitable for an \
         interactive investigation game. Difficulty tier: {difficulty}. \
         The story must feature exactly {suspects} suspects and take place \
         across several distinct locations. Establish the crime, the victim, \
         each suspect's motive, and enough ambiguity that no suspect is \
         obviously guilty. Write 6-10 paragraphs of prose. Do not reveal the \
         culprit.",
        difficulty = difficulty.as_db_str(),
        suspects = difficulty.suspect_target(),
    )
}

/// Step 2: weave clue-trigger annotations into the narrative.
pub fn enhancement_prompt(story: &str) -> String {
    format!(
        "Rewrite the following mystery narrative, weaving in bracketed clue \
         triggers of the form [CLUE: short description] at the points where \
         an attentive investigator could notice something. Add between 4 and \
         10 triggers. Preserve the plot, tone, and paragraph structure; \
         change nothing else.\n\n{story}"
    )
}

/// Step 3a: player-facing introduction.
pub fn intro_prompt(enhanced_story: &str) -> String {
    format!(
        "Write a two-paragraph briefing addressed to the detective taking \
         this case. Summarize the crime and the stakes without revealing any \
         clue triggers or the culprit. Base it on this narrative:\n\n\
         {enhanced_story}"
    )
}

/// Step 3b: structured clue extraction from the trigger annotations.
pub fn clue_extraction_prompt(enhanced_story: &str, difficulty: Difficulty) -> String {
    format!(
        "Extract the investigation clues from the [CLUE: ...] triggers in \
         the narrative below. Produce about {count} clues. Respond with a \
         single JSON object and nothing else, shaped exactly like:\n\
         {{\"clues\": [{{\"id\": \"clue-1\", \"title\": \"...\", \
         \"text\": \"...\", \"related_location\": \"location-id or null\", \
         \"related_suspect\": \"suspect name or null\"}}]}}\n\n\
         Narrative:\n{enhanced_story}",
        count = difficulty.clue_target(),
    )
}

/// Step 3c: map topology and suspect roster (no images yet).
pub fn map_prompt(enhanced_story: &str) -> String {
    format!(
        "From the narrative below, produce the investigation map: every \
         distinct location the story visits and every suspect. Respond with \
         a single JSON object and nothing else, shaped exactly like:\n\
         {{\"locations\": [{{\"id\": \"kebab-case-id\", \"display_name\": \
         \"...\", \"description\": \"one paragraph\"}}], \"suspects\": \
         [{{\"name\": \"...\", \"description\": \"...\", \"alibi\": \
         \"...\"}}]}}\n\
         Location ids must be unique.\n\n\
         Narrative:\n{enhanced_story}"
    )
}

/// Step 4: crime-scene image for one location.
pub fn location_image_prompt(location: &Location) -> String {
    format!(
        "Atmospheric crime-scene illustration of {name}: {description} \
         Moody noir lighting, no people, no text.",
        name = location.display_name,
        description = location.description,
    )
}

/// In-character interrogation responses, one line per question.
pub fn interrogation_prompt(suspect: &Suspect, questions: &[String]) -> String {
    let numbered: Vec<String> = questions
        .iter()
        .enumerate()
        .map(|(i, q)| format!("{}. {}", i + 1, q))
        .collect();
    format!(
        "You are roleplaying the suspect {name} under interrogation. \
         Background: {description} Stated alibi: {alibi} \
         Answer each question in character, evasive where the alibi is thin, \
         one numbered line per question, nothing else.\n{questions}",
        name = suspect.name,
        description = suspect.description,
        alibi = suspect.alibi,
        questions = numbered.join("\n"),
    )
}

/// Step 5: rendered overview map image.
pub fn map_image_prompt(map: &CaseMap) -> String {
    let names: Vec<&str> = map.locations.iter().map(|l| l.display_name.as_str()).collect();
    format!(
        "Hand-drawn investigation map connecting these locations: {}. \
         Vintage detective-board style with ink labels, no text beyond the \
         location names.",
        names.join(", "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_story_prompt_carries_difficulty_targets() {
        let prompt = story_prompt(Difficulty::Inspector);
        assert!(prompt.contains("Inspector"));
        assert!(prompt.contains(&Difficulty::Inspector.suspect_target().to_string()));
    }

    #[test]
    fn test_enhancement_prompt_includes_story() {
        let prompt = enhancement_prompt("The vault stood open.");
        assert!(prompt.contains("[CLUE:"));
        assert!(prompt.contains("The vault stood open."));
    }

    #[test]
    fn test_structured_prompts_demand_json() {
        let clues = clue_extraction_prompt("story", Difficulty::Rookie);
        assert!(clues.contains("single JSON object"));
        assert!(clues.contains("\"clues\""));

        let map = map_prompt("story");
        assert!(map.contains("single JSON object"));
        assert!(map.contains("\"locations\""));
        assert!(map.contains("\"suspects\""));
    }

    #[test]
    fn test_interrogation_prompt_numbers_questions() {
        let suspect = Suspect {
            name: "Vera Kline".to_string(),
            description: "The night watchman's cousin.".to_string(),
            alibi: "Claims she was at the docks.".to_string(),
        };
        let prompt = interrogation_prompt(
            &suspect,
            &["Where were you?".to_string(), "Who saw you?".to_string()],
        );
        assert!(prompt.contains("Vera Kline"));
        assert!(prompt.contains("1. Where were you?"));
        assert!(prompt.contains("2. Who saw you?"));
    }

    #[test]
    fn test_location_image_prompt_uses_location_fields() {
        let location = Location {
            id: "observatory".to_string(),
            display_name: "Old Observatory".to_string(),
            description: "Dust everywhere except the telescope.".to_string(),
            image: None,
        };
        let prompt = location_image_prompt(&location);
        assert!(prompt.contains("Old Observatory"));
        assert!(prompt.contains("telescope"));
    }
}
