//! Request construction: the judging prompt and the `generateContent` body.

use agora_core::{analysis::Transcript, node::Role};
use serde_json::{Value, json};

/// The judging prompt for `transcript`.
///
/// Only PRO and CON entries are quoted; judge interjections are left out
/// so the model scores the debaters alone.
pub fn build_prompt(transcript: &Transcript) -> String {
  let history = transcript
    .entries
    .iter()
    .filter(|e| matches!(e.role, Role::Pro | Role::Con))
    .map(|e| format!("{}: {}", e.role, e.content))
    .collect::<Vec<_>>()
    .join("\n");

  format!(
    "You are an impartial, expert debate judge.\n\
     The topic is: \"{topic}\".\n\
     \n\
     Transcript of the debate so far:\n\
     {history}\n\
     \n\
     Weigh the arguments on logic, evidence, and rhetorical skill. Score \
     each side from 0 to 100, name the side currently ahead, and give a \
     short summary of your reasoning.\n",
    topic = transcript.topic,
  )
}

/// JSON schema the model must answer in.
pub fn response_schema() -> Value {
  json!({
    "type": "OBJECT",
    "properties": {
      "winner":    { "type": "STRING", "description": "Either 'PRO' or 'CON'" },
      "reasoning": { "type": "STRING", "description": "Why that side is ahead, in a few sentences" },
      "proScore":  { "type": "NUMBER", "description": "Score out of 100" },
      "conScore":  { "type": "NUMBER", "description": "Score out of 100" }
    },
    "required": ["winner", "reasoning", "proScore", "conScore"]
  })
}

/// Full `generateContent` request body for `transcript`.
pub fn request_body(transcript: &Transcript) -> Value {
  json!({
    "contents": [{
      "parts": [{ "text": build_prompt(transcript) }]
    }],
    "generationConfig": {
      "responseMimeType": "application/json",
      "responseSchema": response_schema()
    }
  })
}
