// Prompt templates for each intent

pub(super) const SYSTEM_DESCRIPTION: &str = "\
I am an agentic assistant written in Rust. I answer questions with a \
retrieval-augmented generation pipeline: knowledge-base paragraphs are embedded \
with an Ollama embedding model, ranked by cosine similarity, and handed to a \
Llama 3.3 model served over an OpenAI-compatible API. I can also list and read \
files in my own repository and evaluate myself against a fixed question set.";

pub(super) const ARCHITECTURE_QUERY: &str =
    "Explain how this AI system was built using RAG and tools.";

pub(super) const SOCIAL_POST_REQUEST: &str = "\
You are an AI agent that uses RAG, tools, and reflection. Write a professional \
LinkedIn-style post (5-7 sentences) where YOU, the agent, introduce yourself in \
the first person. Explain at a high level what you do (RAG over a local \
knowledge base, inspecting the repository, evaluating yourself) and how you \
were built (Rust, Ollama embeddings, an in-memory vector index, tools, an \
agentic loop). Keep the tone authentic and concise. Focus on clarity, not \
buzzwords. Return only the post text, no extra explanations.";

const REFLECTION_INSTRUCTION: &str = "End with: Reflection: <confidence>.";

pub(super) fn tool_summary(observation: &str) -> String {
    format!(
        "Tool output:\n{observation}\n\n\
         Summarize clearly in 3-5 sentences.\n\
         Do NOT mention tools or internal code.\n\
         {REFLECTION_INSTRUCTION}"
    )
}

pub(super) fn social_post(query: &str) -> String {
    format!(
        "The user said:\n\"{query}\"\n\n\
         Generate a LinkedIn-style post about the topic detected above, in this format:\n\
         - An engaging headline with an emoji\n\
         - A 2-3 sentence introduction to the topic\n\
         - Bullet points with key insights or capabilities\n\
         - As an AI agent, mention retrieval over Ollama embeddings and generation with Llama 3.3\n\
         - An invitation to connect at the end\n\
         - 6-8 relevant hashtags\n\n\
         Tone: professional, human-like, enthusiastic, not robotic.\n\
         End with: Reflection: <confidence score>."
    )
}

pub(super) fn architecture(observation: &str) -> String {
    format!(
        "Retrieved info:\n{observation}\n\n\
         Summarize in 3-5 sentences how the AI agent was built:\n\
         - Rust with Ollama embeddings and an in-memory vector index\n\
         - The RAG pipeline\n\
         - Tool-calling ability\n\
         {REFLECTION_INSTRUCTION}"
    )
}

pub(super) fn list_files(observation: &str) -> String {
    format!(
        "These files were found in the repository:\n{observation}\n\n\
         In 2-4 sentences, describe what type of project this is and what these \
         files indicate. Mention 'agentic AI' and 'RAG'.\n\
         {REFLECTION_INSTRUCTION}"
    )
}

pub(super) fn read_file(path: &str, observation: &str) -> String {
    format!(
        "Content of {path}:\n{observation}\n\n\
         Explain this file's purpose in 2-4 sentences.\n\
         {REFLECTION_INSTRUCTION}"
    )
}

pub(super) fn self_evaluation(observation: &str) -> String {
    format!(
        "Self-evaluation data:\n{observation}\n\n\
         Summarize the performance quality, what the scores indicate, and how \
         the system can improve.\n\
         {REFLECTION_INSTRUCTION}"
    )
}

pub(super) fn general(query: &str) -> String {
    format!(
        "{SYSTEM_DESCRIPTION}\n\n\
         User query:\n{query}\n\n\
         Respond in 2-4 sentences.\n\
         {REFLECTION_INSTRUCTION}"
    )
}
