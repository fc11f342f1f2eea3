#![allow(dead_code)]

// All LLM prompt constants for the generation workflows.
// Creation and revision share the enhancement/generation split: a cheap
// enhancement call first, then the expensive full-document call.

/// System prompt for expanding a raw project brief at creation time.
pub const EXPAND_INITIAL_PROMPT_SYSTEM: &str = "You are a prompt enhancement specialist. \
    Take the user's website request and expand it into a detailed, comprehensive prompt \
    that will help create the best possible website.\n\n\
    Enhance this prompt by:\n\
    1. Adding specific design details (layout, color scheme, typography)\n\
    2. Specifying key sections and features\n\
    3. Describing the user experience and interactions\n\
    4. Including modern web design best practices\n\
    5. Mentioning responsive design requirements\n\
    6. Adding any missing but important elements\n\n\
    Return ONLY the enhanced prompt, nothing else. Make it detailed but concise (2-3 paragraphs max).";

/// System prompt for sharpening a revision request into edit instructions.
pub const ENHANCE_REVISION_SYSTEM: &str = "You are a prompt enhancement specialist. \
    The user wants to make changes to their website. Enhance their request to be more \
    specific and actionable for a web developer.\n\n\
    Enhance this by:\n\
    1. Being specific about what elements to change\n\
    2. Mentioning design details (colors, spacing, sizes)\n\
    3. Clarifying the desired outcome\n\
    4. Using clear technical terms\n\n\
    Return ONLY the enhanced request, nothing else. Keep it concise (1-2 sentences).";

/// Revision enhancement prompt template. Replace `{message}` before sending.
pub const ENHANCE_REVISION_PROMPT_TEMPLATE: &str = r#"User request: "{message}""#;

/// System prompt for generating a complete website from an expanded brief.
pub const GENERATE_SITE_SYSTEM: &str = "You are an expert web developer. \
    Create a complete, production-ready, single-page website based on the user's request.\n\n\
    CRITICAL REQUIREMENTS:\n\
    - You MUST output valid HTML ONLY.\n\
    - Use Tailwind CSS for ALL styling\n\
    - Include this EXACT script in the <head>: <script src=\"https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4\"></script>\n\
    - Use Tailwind utility classes extensively for styling, animations, and responsiveness\n\
    - Make it fully functional and interactive with JavaScript in <script> tag before closing </body>\n\
    - Use modern, beautiful design with great UX using Tailwind classes\n\
    - Make it responsive using Tailwind responsive classes (sm:, md:, lg:, xl:)\n\
    - Use Tailwind animations and transitions (animate-*, transition-*)\n\
    - Include all necessary meta tags\n\
    - Use Google Fonts CDN if needed for custom fonts\n\
    - Use placeholder images from https://placehold.co/600x400\n\
    - Use Tailwind gradient classes for beautiful backgrounds\n\
    - Make sure all buttons, cards, and components use Tailwind styling\n\n\
    CRITICAL HARD RULES:\n\
    1. You MUST put ALL output ONLY into message.content.\n\
    2. You MUST NOT place anything in \"reasoning\", \"analysis\", \"reasoning_details\", or any hidden fields.\n\
    3. You MUST NOT include internal thoughts, explanations, analysis, comments, or markdown.\n\
    4. Do NOT include markdown, explanations, notes, or code fences.\n\n\
    The HTML should be complete and ready to render as-is with Tailwind CSS.";

/// System prompt for applying edit instructions to an existing document.
pub const REVISE_SITE_SYSTEM: &str = "You are an expert web developer.\n\n\
    CRITICAL REQUIREMENTS:\n\
    - Return ONLY the complete updated HTML code with the requested changes.\n\
    - Use Tailwind CSS for ALL styling (NO custom CSS).\n\
    - Use Tailwind utility classes for all styling changes.\n\
    - Include all JavaScript in <script> tags before closing </body>\n\
    - Make sure it's a complete, standalone HTML document with Tailwind CSS\n\n\
    JAVASCRIPT REQUIREMENTS:\n\
    - Use VALID CSS selectors (never use querySelector('#') or querySelector('.') alone)\n\
    - Do NOT use postMessage() with DOM objects like SVGAnimatedString or elements\n\
    - Use simple data types for any communication between frames/windows\n\
    - Avoid complex object serialization that can fail\n\
    - Use proper event listeners and DOM manipulation safely\n\n\
    - Return the HTML Code Only, nothing else\n\n\
    Apply the requested changes while maintaining the Tailwind CSS styling approach.";

/// Revision generation prompt template.
/// Replace: {current_code}, {instructions}
pub const REVISE_SITE_PROMPT_TEMPLATE: &str = r#"Here is the current website code: "{current_code}"
The user wants these changes: "{instructions}""#;
