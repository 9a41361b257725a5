//! Built-in shader program.
//!
//! Position, texcoord and normal arrive at attribute locations 0, 1 and 2,
//! matching [`VERTEX_LAYOUT`](engine_graphics::VERTEX_LAYOUT).

/// Uniform holding the per-entity model matrix.
pub const MODEL_UNIFORM: &str = "model";
/// Uniform holding the camera view matrix.
pub const VIEW_UNIFORM: &str = "view";
/// Uniform holding the camera projection matrix.
pub const PROJECTION_UNIFORM: &str = "projection";

pub const DEFAULT_VERTEX_SHADER: &str = r"#version 430 core
layout (location = 0) in vec3 aPos;
layout (location = 1) in vec2 aTexCoords;
layout (location = 2) in vec3 aNormal;

out vec2 TexCoords;
out vec3 Normal;
out vec3 FragPos;

uniform mat4 model;
uniform mat4 view;
uniform mat4 projection;

void main()
{
    FragPos = vec3(model * vec4(aPos, 1.0));
    Normal = mat3(transpose(inverse(model))) * aNormal;
    TexCoords = aTexCoords;
    gl_Position = projection * view * vec4(FragPos, 1.0);
}
";

pub const DEFAULT_FRAGMENT_SHADER: &str = r"#version 430 core
in vec2 TexCoords;
in vec3 Normal;
in vec3 FragPos;

out vec4 FragColor;

uniform sampler2D texture_diffuse;

void main()
{
    FragColor = texture(texture_diffuse, TexCoords);
}
";
